use skirmish_core::{AttackPowers, CellCoord, Faction};
use skirmish_system_rounds::{minimum_boost, Simulation, SimulationError};
use skirmish_world::{query, Battlefield, World};

const SAMPLE: &str = "\
#######
#.G...#
#...EG#
#.#.#G#
#..G#E#
#.....#
#######";

const ELVES_HOLD: &str = "\
#######
#G..#E#
#E#E.E#
#G.##.#
#...#E#
#...E.#
#######";

const ELVES_PUSH: &str = "\
#######
#E..EG#
#.#G.E#
#E.##E#
#G..#.#
#..E#.#
#######";

const GOBLIN_AMBUSH: &str = "\
#######
#E.G#.#
#.#G..#
#G.#.G#
#G..#.#
#...E.#
#######";

const LONG_CORRIDOR: &str = "\
#######
#.E...#
#.#..G#
#.###.#
#E#G#G#
#...#G#
#######";

const OPEN_FIELD: &str = "\
#########
#G......#
#.E.#...#
#..##..G#
#...##..#
#...#...#
#.G...G.#
#.....G.#
#########";

#[test]
fn sample_battle_ends_after_47_rounds() {
    let mut simulation = Simulation::from_map(SAMPLE, AttackPowers::default()).expect("valid map");

    let outcome = simulation.run().expect("combat ends");

    assert_eq!(outcome.rounds, 47);
    assert_eq!(outcome.remaining_hit_points, 590);
    assert_eq!(outcome.winner, Faction::Goblin);
    assert_eq!(outcome.score(), 27730);
    assert_eq!(outcome.casualties.of(Faction::Elf), 2);

    let survivors: Vec<(CellCoord, i32)> = query::unit_view(simulation.world())
        .iter()
        .map(|unit| (unit.cell, unit.hit_points))
        .collect();
    assert_eq!(
        survivors,
        vec![
            (CellCoord::new(1, 1), 200),
            (CellCoord::new(2, 2), 131),
            (CellCoord::new(3, 5), 59),
            (CellCoord::new(5, 5), 200),
        ]
    );
}

#[test]
fn boosted_elves_win_the_sample_without_losses() {
    let powers = AttackPowers::default().with_override(Faction::Elf, 15);
    let mut simulation = Simulation::from_map(SAMPLE, powers).expect("valid map");

    let outcome = simulation.run().expect("combat ends");

    assert_eq!(outcome.rounds, 29);
    assert_eq!(outcome.remaining_hit_points, 172);
    assert_eq!(outcome.winner, Faction::Elf);
    assert_eq!(outcome.casualties.of(Faction::Elf), 0);
    assert_eq!(outcome.score(), 4988);
}

#[test]
fn reference_battles_match_known_scores() {
    let cases = [
        (ELVES_HOLD, 37, 982, Faction::Elf, 36334),
        (ELVES_PUSH, 46, 859, Faction::Elf, 39514),
        (GOBLIN_AMBUSH, 35, 793, Faction::Goblin, 27755),
        (LONG_CORRIDOR, 54, 536, Faction::Goblin, 28944),
        (OPEN_FIELD, 20, 937, Faction::Goblin, 18740),
    ];

    for (map, rounds, hit_points, winner, score) in cases {
        let mut simulation = Simulation::from_map(map, AttackPowers::default()).expect("valid map");
        let outcome = simulation.run().expect("combat ends");
        assert_eq!(outcome.rounds, rounds, "rounds for\n{map}");
        assert_eq!(outcome.remaining_hit_points, hit_points, "hit points for\n{map}");
        assert_eq!(outcome.winner, winner, "winner for\n{map}");
        assert_eq!(outcome.score(), score, "score for\n{map}");
    }
}

#[test]
fn minimum_boost_finds_the_first_flawless_attack_power() {
    let cases = [
        (SAMPLE, 15, 4988),
        (ELVES_PUSH, 4, 31284),
        (GOBLIN_AMBUSH, 15, 3478),
        (LONG_CORRIDOR, 12, 6474),
        (OPEN_FIELD, 34, 1140),
    ];

    for (map, attack_power, score) in cases {
        let (battlefield, seeds) = Battlefield::parse(map).expect("valid map");
        let boost = minimum_boost(&battlefield, &seeds, Faction::Elf).expect("boost exists");
        assert_eq!(boost.attack_power, attack_power, "attack power for\n{map}");
        assert_eq!(boost.outcome.score(), score, "score for\n{map}");
        assert_eq!(boost.outcome.casualties.of(Faction::Elf), 0);
    }
}

#[test]
fn minimum_boost_gives_up_when_the_faction_is_absent() {
    let (battlefield, seeds) = Battlefield::parse("#G.G#").expect("valid map");

    let result = minimum_boost(&battlefield, &seeds, Faction::Elf);

    assert_eq!(
        result,
        Err(SimulationError::NoFlawlessVictory {
            faction: Faction::Elf,
            max_power: 200,
        })
    );
}

#[test]
fn minimum_boost_keeps_searching_past_stalled_battles() {
    let (battlefield, seeds) = Battlefield::parse("#G#E.G#").expect("valid map");

    let world = World::new(battlefield.clone(), &seeds, AttackPowers::default());
    let stalled = Simulation::new(world).run();
    assert!(matches!(stalled, Err(SimulationError::Stalemate { .. })));

    let result = minimum_boost(&battlefield, &seeds, Faction::Elf);

    assert_eq!(
        result,
        Err(SimulationError::NoFlawlessVictory {
            faction: Faction::Elf,
            max_power: 200,
        })
    );
}

#[test]
fn malformed_maps_fail_before_combat() {
    let result = Simulation::from_map("#E?G#", AttackPowers::default());

    assert!(matches!(result, Err(SimulationError::Map(_))));
}
