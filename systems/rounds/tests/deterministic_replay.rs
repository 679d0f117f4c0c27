use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use skirmish_core::{AttackPowers, CellCoord, CombatOutcome, Event, Faction, UnitId};
use skirmish_system_rounds::Simulation;
use skirmish_world::query;

const MAP: &str = "\
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
fn replay_produces_identical_logs_and_outcomes() {
    let first = replay(AttackPowers::default());
    let second = replay(AttackPowers::default());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.outcome.score(), 18740);
}

#[test]
fn boosted_replay_diverges_from_default_replay() {
    let default = replay(AttackPowers::default());
    let boosted = replay(AttackPowers::default().with_override(Faction::Elf, 34));

    assert_ne!(default.fingerprint(), boosted.fingerprint());
    assert_eq!(boosted.outcome.winner, Faction::Elf);
}

#[test]
fn round_reports_arrive_in_order_with_round_markers() {
    let outcome = replay(AttackPowers::default());

    for (index, round) in outcome.rounds.iter().enumerate() {
        let expected = u32::try_from(index + 1).expect("round fits");
        assert_eq!(round.round, expected);
        assert!(round
            .events
            .contains(&Event::RoundCompleted { round: expected }));
    }
    assert_eq!(
        u32::try_from(outcome.rounds.len()).expect("round count fits"),
        outcome.outcome.rounds
    );
}

fn replay(powers: AttackPowers) -> ReplayOutcome {
    let mut simulation = Simulation::from_map(MAP, powers).expect("valid map");
    let mut rounds = Vec::new();

    let outcome = simulation
        .run_with(|report| {
            rounds.push(RoundRecord {
                round: report.round,
                events: report.events.to_vec(),
                units: query::unit_view(report.world)
                    .iter()
                    .map(|unit| (unit.id, unit.cell, unit.hit_points))
                    .collect(),
            });
        })
        .expect("combat ends");

    ReplayOutcome { rounds, outcome }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    rounds: Vec<RoundRecord>,
    outcome: CombatOutcome,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RoundRecord {
    round: u32,
    events: Vec<Event>,
    units: Vec<(UnitId, CellCoord, i32)>,
}
