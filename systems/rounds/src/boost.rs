//! Search for the smallest attack power that wins a battle without losses.

use skirmish_core::{
    AttackPowers, CombatOutcome, Faction, DEFAULT_ATTACK_POWER, DEFAULT_HIT_POINTS,
};
use skirmish_world::{Battlefield, UnitSeed, World};

use crate::{RoundStatus, Simulation, SimulationError};

/// Attack power that first achieved a flawless victory, with the battle it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoostOutcome {
    /// Smallest attack power that won without losing a unit.
    pub attack_power: u32,
    /// Outcome of the battle fought at that attack power.
    pub outcome: CombatOutcome,
}

/// Raises `faction`'s attack power one point at a time, starting just above
/// the default, until it wins without losing a single unit.
///
/// Outcomes are not monotonic in attack power, so every value is tried in
/// order. A battle is abandoned at the first loss, and a battle that stalls
/// counts as a failed attempt. The search stops at the default hit points,
/// where every blow is lethal.
pub fn minimum_boost(
    battlefield: &Battlefield,
    seeds: &[UnitSeed],
    faction: Faction,
) -> Result<BoostOutcome, SimulationError> {
    let max_power = u32::try_from(DEFAULT_HIT_POINTS).unwrap_or(u32::MAX);

    for attack_power in DEFAULT_ATTACK_POWER + 1..=max_power {
        let powers = AttackPowers::default().with_override(faction, attack_power);
        let world = World::new(battlefield.clone(), seeds, powers);
        let mut simulation = Simulation::new(world);

        let flawless = loop {
            match simulation.step_round() {
                Err(SimulationError::Stalemate { rounds }) => {
                    tracing::debug!(%faction, attack_power, rounds, "boost attempt stalled");
                    break None;
                }
                Err(error) => return Err(error),
                Ok(RoundStatus::Completed { .. }) => {
                    if simulation.casualties().of(faction) > 0 {
                        break None;
                    }
                }
                Ok(RoundStatus::CombatOver(outcome)) => {
                    let won = outcome.winner == faction && outcome.casualties.of(faction) == 0;
                    break won.then_some(outcome);
                }
            }
        };

        tracing::info!(
            %faction,
            attack_power,
            flawless = flawless.is_some(),
            "boost attempt finished"
        );

        if let Some(outcome) = flawless {
            return Ok(BoostOutcome {
                attack_power,
                outcome,
            });
        }
    }

    Err(SimulationError::NoFlawlessVictory { faction, max_power })
}
