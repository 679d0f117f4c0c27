use skirmish_core::{AttackPowers, CellCoord, Command, Event, Faction, UnitId};
use skirmish_system_turn::{MovementPlan, TurnOutcome, TurnResolver, TurnSummary};
use skirmish_world::{self as world, query, World};

const CROSSROADS: &str = "\
G....
..G..
..EG.
..G..
...G.";

#[test]
fn ties_on_hit_points_strike_the_first_enemy_in_reading_order() {
    let world = load(CROSSROADS, AttackPowers::default());
    let resolver = TurnResolver::new();
    let elf = unit_at(&world, 2, 2);

    let command = resolver.plan_attack(&world, elf).expect("elf alive");

    assert_eq!(
        command,
        Some(Command::Attack {
            attacker: elf,
            target: unit_at(&world, 1, 2),
        })
    );
}

#[test]
fn weakest_adjacent_enemy_is_struck_first() {
    let powers = AttackPowers::default().with_override(Faction::Elf, 1);
    let mut world = load(CROSSROADS, powers);
    let resolver = TurnResolver::new();
    let elf = unit_at(&world, 2, 2);
    let southern = unit_at(&world, 3, 2);
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::Attack {
            attacker: elf,
            target: southern,
        },
        &mut events,
    )
    .expect("legal attack");

    let command = resolver.plan_attack(&world, elf).expect("elf alive");

    assert_eq!(
        command,
        Some(Command::Attack {
            attacker: elf,
            target: southern,
        })
    );
}

#[test]
fn unit_attacks_in_the_turn_it_arrives() {
    let mut world = load("#E.G#", AttackPowers::default());
    let mut resolver = TurnResolver::new();
    let mut events = Vec::new();
    let elf = unit_at(&world, 0, 1);
    let goblin = unit_at(&world, 0, 3);

    let outcome = resolver
        .take_turn(&mut world, elf, &mut events)
        .expect("valid turn");

    assert_eq!(
        outcome,
        TurnOutcome::Completed(TurnSummary {
            moved_to: Some(CellCoord::new(0, 2)),
            attacked: Some(goblin),
        })
    );
    assert_eq!(
        events,
        vec![
            Event::UnitMoved {
                unit: elf,
                from: CellCoord::new(0, 1),
                to: CellCoord::new(0, 2),
            },
            Event::UnitAttacked {
                attacker: elf,
                target: goblin,
                damage: 3,
                remaining: 197,
            },
        ]
    );
}

#[test]
fn distant_unit_moves_without_attacking() {
    let mut world = load("#E...G#", AttackPowers::default());
    let mut resolver = TurnResolver::new();
    let mut events = Vec::new();
    let elf = unit_at(&world, 0, 1);

    let plan = resolver.plan_movement(&world, elf).expect("elf alive");
    let MovementPlan::Step(step) = plan else {
        panic!("expected a step, got {plan:?}");
    };
    assert_eq!(step.destination, CellCoord::new(0, 4));
    assert_eq!(step.distance, 3);

    let outcome = resolver
        .take_turn(&mut world, elf, &mut events)
        .expect("valid turn");

    assert_eq!(
        outcome,
        TurnOutcome::Completed(TurnSummary {
            moved_to: Some(CellCoord::new(0, 2)),
            attacked: None,
        })
    );
    assert_eq!(query::total_hit_points(&world), 400);
}

#[test]
fn movement_round_matches_reference_positions() {
    let mut world = load(
        "\
#########
#G..G..G#
#.......#
#.......#
#G..E..G#
#.......#
#.......#
#G..G..G#
#########",
        AttackPowers::default(),
    );
    let mut resolver = TurnResolver::new();
    let mut events = Vec::new();

    let order: Vec<UnitId> = query::unit_view(&world).iter().map(|unit| unit.id).collect();
    for unit in order {
        let _ = resolver
            .take_turn(&mut world, unit, &mut events)
            .expect("valid turn");
    }

    let positions: Vec<(Faction, CellCoord)> = query::unit_view(&world)
        .iter()
        .map(|unit| (unit.faction, unit.cell))
        .collect();
    assert_eq!(
        positions,
        vec![
            (Faction::Goblin, CellCoord::new(1, 2)),
            (Faction::Goblin, CellCoord::new(1, 6)),
            (Faction::Goblin, CellCoord::new(2, 4)),
            (Faction::Elf, CellCoord::new(3, 4)),
            (Faction::Goblin, CellCoord::new(3, 7)),
            (Faction::Goblin, CellCoord::new(4, 2)),
            (Faction::Goblin, CellCoord::new(6, 1)),
            (Faction::Goblin, CellCoord::new(6, 4)),
            (Faction::Goblin, CellCoord::new(6, 7)),
        ]
    );
}

fn load(map: &str, powers: AttackPowers) -> World {
    World::from_map(map, powers).expect("valid map")
}

fn unit_at(world: &World, row: u32, column: u32) -> UnitId {
    query::registry(world)
        .occupant(CellCoord::new(row, column))
        .expect("unit present")
}
