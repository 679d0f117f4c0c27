#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduler that drives turns until one faction is eliminated.
//!
//! Each round freezes the turn order once, in reading order of the unit
//! positions at the start of the round, and lets every unit that is still
//! alive take its turn. Combat ends as soon as a faction is wiped out. The
//! round in progress counts toward the score only when no living unit was
//! left waiting for its turn in that round.

mod boost;

pub use boost::{minimum_boost, BoostOutcome};

use std::collections::HashSet;

use skirmish_core::{
    AttackPowers, Casualties, CellCoord, CombatOutcome, Event, Faction, RuleViolation, UnitId,
};
use skirmish_system_turn::{TurnOutcome, TurnResolver};
use skirmish_world::{query, MapError, World};
use thiserror::Error;

/// Reasons a simulation stops without a result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The map could not be loaded.
    #[error("invalid map: {0}")]
    Map(#[from] MapError),
    /// The turn state machine issued a command the world refused.
    #[error("rule violation: {0}")]
    RuleViolation(#[from] RuleViolation),
    /// The map holds no units at all.
    #[error("the battlefield holds no units")]
    NoCombatants,
    /// Units keep repeating the same positions without landing an attack.
    #[error("no faction can reach the other; combat stalled after {rounds} rounds")]
    Stalemate {
        /// Rounds completed before the repetition was detected.
        rounds: u32,
    },
    /// No attack power up to the limit lets the faction win without losses.
    #[error("{faction} cannot win without losses at any attack power up to {max_power}")]
    NoFlawlessVictory {
        /// Faction whose attack power was boosted.
        faction: Faction,
        /// Highest attack power attempted.
        max_power: u32,
    },
}

/// Progress reported after stepping a single round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    /// Every unit alive at the start of the round took its turn.
    Completed {
        /// One-based index of the round that completed.
        round: u32,
    },
    /// A faction was eliminated; the outcome is final.
    CombatOver(CombatOutcome),
}

/// Read-only snapshot handed to observers after every completed round.
#[derive(Clone, Copy, Debug)]
pub struct RoundReport<'a> {
    /// One-based index of the round that completed.
    pub round: u32,
    /// World state at the end of the round.
    pub world: &'a World,
    /// Events produced during the round, in the order they happened.
    pub events: &'a [Event],
}

/// Drives a world through rounds of combat.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    resolver: TurnResolver,
    rounds_completed: u32,
    casualties: Casualties,
    round_events: Vec<Event>,
    quiet_positions: HashSet<Vec<(UnitId, CellCoord)>>,
    outcome: Option<CombatOutcome>,
}

impl Simulation {
    /// Prepares a simulation over the provided world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            world,
            resolver: TurnResolver::new(),
            rounds_completed: 0,
            casualties: Casualties::default(),
            round_events: Vec::new(),
            quiet_positions: HashSet::new(),
            outcome: None,
        }
    }

    /// Parses a map and prepares a simulation with the provided attack powers.
    pub fn from_map(text: &str, powers: AttackPowers) -> Result<Self, SimulationError> {
        Ok(Self::new(World::from_map(text, powers)?))
    }

    /// Current world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Rounds that completed in full so far.
    #[must_use]
    pub const fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    /// Units each faction has lost so far.
    #[must_use]
    pub const fn casualties(&self) -> Casualties {
        self.casualties
    }

    /// Final outcome, once a faction has been eliminated.
    #[must_use]
    pub const fn outcome(&self) -> Option<CombatOutcome> {
        self.outcome
    }

    /// Runs rounds until a faction is eliminated.
    pub fn run(&mut self) -> Result<CombatOutcome, SimulationError> {
        self.run_with(|_| {})
    }

    /// Runs rounds until a faction is eliminated, reporting every completed round.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<CombatOutcome, SimulationError>
    where
        F: FnMut(RoundReport<'_>),
    {
        let mut reported = self.rounds_completed;
        loop {
            match self.step_round()? {
                RoundStatus::Completed { round } => {
                    reported = round;
                    observer(RoundReport {
                        round,
                        world: &self.world,
                        events: &self.round_events,
                    });
                }
                RoundStatus::CombatOver(outcome) => {
                    // The final blow may have been the last turn of a full round.
                    if outcome.rounds > reported {
                        observer(RoundReport {
                            round: outcome.rounds,
                            world: &self.world,
                            events: &self.round_events,
                        });
                    }
                    return Ok(outcome);
                }
            }
        }
    }

    /// Plays a single round.
    ///
    /// Calling this after combat has ended returns the final outcome again.
    pub fn step_round(&mut self) -> Result<RoundStatus, SimulationError> {
        if let Some(outcome) = self.outcome {
            return Ok(RoundStatus::CombatOver(outcome));
        }
        if query::registry(&self.world).is_empty() {
            return Err(SimulationError::NoCombatants);
        }

        self.round_events.clear();
        let order: Vec<UnitId> = query::unit_view(&self.world)
            .iter()
            .map(|unit| unit.id)
            .collect();
        let hit_points_at_start = query::total_hit_points(&self.world);

        for (position, &unit) in order.iter().enumerate() {
            let Some(faction) = query::registry(&self.world)
                .get(unit)
                .map(|entry| entry.faction())
            else {
                continue;
            };

            let first_new_event = self.round_events.len();
            let outcome = self
                .resolver
                .take_turn(&mut self.world, unit, &mut self.round_events)?;
            self.record_casualties(first_new_event);

            if outcome == TurnOutcome::NoEnemies {
                return Ok(self.finish(faction));
            }

            if query::living_count(&self.world, faction.opponent()) == 0 {
                let registry = query::registry(&self.world);
                let someone_still_waiting = order[position + 1..]
                    .iter()
                    .any(|later| registry.get(*later).is_some());
                if !someone_still_waiting {
                    self.complete_round();
                }
                return Ok(self.finish(faction));
            }
        }

        self.complete_round();
        let wounded = query::total_hit_points(&self.world) < hit_points_at_start;
        self.detect_stalemate(wounded)?;
        Ok(RoundStatus::Completed {
            round: self.rounds_completed,
        })
    }

    fn record_casualties(&mut self, first_new_event: usize) {
        for event in &self.round_events[first_new_event..] {
            if let Event::UnitDied { faction, .. } = event {
                self.casualties.record(*faction);
            }
        }
    }

    fn complete_round(&mut self) {
        self.rounds_completed = self.rounds_completed.saturating_add(1);
        self.round_events.push(Event::RoundCompleted {
            round: self.rounds_completed,
        });
        tracing::debug!(
            round = self.rounds_completed,
            hit_points = query::total_hit_points(&self.world),
            "round completed"
        );
    }

    /// Positions are the only other state, so a round that costs no hit points
    /// and reproduces earlier positions will repeat forever. Blows of zero
    /// power count as quiet.
    fn detect_stalemate(&mut self, wounded: bool) -> Result<(), SimulationError> {
        if wounded {
            self.quiet_positions.clear();
            return Ok(());
        }

        let positions: Vec<(UnitId, CellCoord)> = query::unit_view(&self.world)
            .iter()
            .map(|unit| (unit.id, unit.cell))
            .collect();
        if self.quiet_positions.insert(positions) {
            return Ok(());
        }

        tracing::warn!(rounds = self.rounds_completed, "combat stalled");
        Err(SimulationError::Stalemate {
            rounds: self.rounds_completed,
        })
    }

    fn finish(&mut self, winner: Faction) -> RoundStatus {
        let outcome = CombatOutcome {
            rounds: self.rounds_completed,
            remaining_hit_points: query::total_hit_points(&self.world),
            winner,
            casualties: self.casualties,
        };
        self.round_events.push(Event::CombatEnded {
            rounds: outcome.rounds,
            winner,
        });
        tracing::info!(
            rounds = outcome.rounds,
            hit_points = outcome.remaining_hit_points,
            score = outcome.score(),
            %winner,
            "combat ended"
        );
        self.outcome = Some(outcome);
        RoundStatus::CombatOver(outcome)
    }
}
