#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-unit turn state machine: find an enemy, close in, strike.

use skirmish_core::{CellCoord, Command, Event, RuleViolation, UnitId, UnitSnapshot};
use skirmish_system_pathfinding::{Pathfinder, PlannedStep};
use skirmish_world::{self as world, query, World};

/// Phases a unit passes through while taking its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Looks for an enemy already standing beside the unit.
    CheckAdjacentEnemy,
    /// Picks a destination next to an enemy and the step toward it.
    SelectTargetAndMove,
    /// Executes the chosen step.
    Move,
    /// Strikes the weakest adjacent enemy.
    Attack,
    /// Ends the turn.
    Idle,
}

/// Movement decision taken before a unit moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementPlan {
    /// An enemy already stands beside the unit, so it holds its ground.
    InRange,
    /// The opposing faction has no living units left.
    NoEnemies,
    /// The unit should take the provided step.
    Step(PlannedStep),
    /// No cell next to an enemy can be reached this turn.
    Blocked,
}

/// Result of a single unit's turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The unit found no enemies; combat is over.
    NoEnemies,
    /// The unit finished its turn.
    Completed(TurnSummary),
}

/// Actions a unit performed during a completed turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// Cell the unit stepped into, if it moved.
    pub moved_to: Option<CellCoord>,
    /// Enemy the unit struck, if it attacked.
    pub attacked: Option<UnitId>,
}

/// System that resolves one unit's turn at a time against the world.
#[derive(Debug, Default)]
pub struct TurnResolver {
    pathfinder: Pathfinder,
    candidates: Vec<CellCoord>,
}

impl TurnResolver {
    /// Creates a resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the unit's turn to completion, applying its commands to the world.
    ///
    /// A unit that becomes adjacent to an enemy by moving attacks in the same
    /// turn. Rule violations reported by the world abort the turn.
    pub fn take_turn(
        &mut self,
        world: &mut World,
        unit: UnitId,
        out_events: &mut Vec<Event>,
    ) -> Result<TurnOutcome, RuleViolation> {
        let mut summary = TurnSummary::default();
        let mut pending_step: Option<PlannedStep> = None;
        let mut phase = TurnPhase::CheckAdjacentEnemy;

        loop {
            phase = match phase {
                TurnPhase::CheckAdjacentEnemy => {
                    let snapshot = living(world, unit)?;
                    if weakest_adjacent_enemy(world, &snapshot).is_some() {
                        TurnPhase::Attack
                    } else {
                        TurnPhase::SelectTargetAndMove
                    }
                }
                TurnPhase::SelectTargetAndMove => match self.plan_movement(world, unit)? {
                    MovementPlan::InRange => TurnPhase::Attack,
                    MovementPlan::NoEnemies => {
                        tracing::trace!(%unit, "no enemies left");
                        return Ok(TurnOutcome::NoEnemies);
                    }
                    MovementPlan::Step(step) => {
                        pending_step = Some(step);
                        TurnPhase::Move
                    }
                    MovementPlan::Blocked => TurnPhase::Idle,
                },
                TurnPhase::Move => {
                    if let Some(planned) = pending_step.take() {
                        world::apply(
                            world,
                            Command::MoveUnit {
                                unit,
                                to: planned.step,
                            },
                            out_events,
                        )?;
                        summary.moved_to = Some(planned.step);
                    }
                    let snapshot = living(world, unit)?;
                    if weakest_adjacent_enemy(world, &snapshot).is_some() {
                        TurnPhase::Attack
                    } else {
                        TurnPhase::Idle
                    }
                }
                TurnPhase::Attack => {
                    let command = self
                        .plan_attack(world, unit)?
                        .ok_or(RuleViolation::NoTargetInReach { attacker: unit })?;
                    world::apply(world, command, out_events)?;
                    if let Command::Attack { target, .. } = command {
                        summary.attacked = Some(target);
                    }
                    TurnPhase::Idle
                }
                TurnPhase::Idle => return Ok(TurnOutcome::Completed(summary)),
            };
        }
    }

    /// Decides whether and where the unit moves, without touching the world.
    pub fn plan_movement(
        &mut self,
        world: &World,
        unit: UnitId,
    ) -> Result<MovementPlan, RuleViolation> {
        let snapshot = living(world, unit)?;
        if weakest_adjacent_enemy(world, &snapshot).is_some() {
            return Ok(MovementPlan::InRange);
        }

        let battlefield = query::battlefield(world);
        let occupancy = query::occupancy_view(world);
        let units = query::unit_view(world);
        let opponent = snapshot.faction.opponent();

        if units.of_faction(opponent).next().is_none() {
            return Ok(MovementPlan::NoEnemies);
        }

        self.candidates.clear();
        self.candidates.extend(
            units
                .of_faction(opponent)
                .flat_map(|enemy| battlefield.adjacent(enemy.cell))
                .filter(|cell| battlefield.is_open(*cell) && occupancy.is_free(*cell)),
        );
        self.candidates.sort_unstable();
        self.candidates.dedup();

        let planned = self.pathfinder.next_step(
            snapshot.cell,
            &self.candidates,
            occupancy.dimensions(),
            |cell| battlefield.is_open(cell) && occupancy.is_free(cell),
        );

        Ok(match planned {
            Some(step) => MovementPlan::Step(step),
            None => MovementPlan::Blocked,
        })
    }

    /// Chooses the attack the unit would make from its current cell, if any.
    ///
    /// The adjacent enemy with the fewest hit points is struck; ties go to the
    /// enemy earliest in reading order.
    pub fn plan_attack(
        &self,
        world: &World,
        unit: UnitId,
    ) -> Result<Option<Command>, RuleViolation> {
        let snapshot = living(world, unit)?;
        Ok(
            weakest_adjacent_enemy(world, &snapshot).map(|target| Command::Attack {
                attacker: unit,
                target,
            }),
        )
    }
}

fn living(world: &World, unit: UnitId) -> Result<UnitSnapshot, RuleViolation> {
    query::registry(world)
        .get(unit)
        .map(|entry| entry.snapshot())
        .ok_or(RuleViolation::UnknownUnit { unit })
}

fn weakest_adjacent_enemy(world: &World, attacker: &UnitSnapshot) -> Option<UnitId> {
    let battlefield = query::battlefield(world);
    let registry = query::registry(world);
    let opponent = attacker.faction.opponent();

    battlefield
        .adjacent(attacker.cell)
        .filter_map(|cell| registry.occupant(cell))
        .filter_map(|id| registry.get(id))
        .filter(|enemy| enemy.faction() == opponent)
        .min_by_key(|enemy| (enemy.hit_points(), enemy.cell()))
        .map(|enemy| enemy.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::AttackPowers;

    fn world(map: &str) -> World {
        World::from_map(map, AttackPowers::default()).expect("valid map")
    }

    fn unit_at(world: &World, row: u32, column: u32) -> UnitId {
        query::registry(world)
            .occupant(CellCoord::new(row, column))
            .expect("unit present")
    }

    #[test]
    fn adjacent_enemy_skips_movement() {
        let world = world("#.EG.#");
        let mut resolver = TurnResolver::new();
        let elf = unit_at(&world, 0, 2);

        assert_eq!(resolver.plan_movement(&world, elf), Ok(MovementPlan::InRange));
    }

    #[test]
    fn lone_faction_reports_no_enemies() {
        let mut world = world("#E..E#");
        let mut resolver = TurnResolver::new();
        let mut events = Vec::new();
        let elf = unit_at(&world, 0, 1);

        let outcome = resolver
            .take_turn(&mut world, elf, &mut events)
            .expect("valid turn");

        assert_eq!(outcome, TurnOutcome::NoEnemies);
        assert!(events.is_empty());
    }

    #[test]
    fn walled_off_unit_stays_idle() {
        let mut world = world("#E#G#");
        let mut resolver = TurnResolver::new();
        let mut events = Vec::new();
        let elf = unit_at(&world, 0, 1);

        let outcome = resolver
            .take_turn(&mut world, elf, &mut events)
            .expect("valid turn");

        assert_eq!(outcome, TurnOutcome::Completed(TurnSummary::default()));
        assert!(events.is_empty());
    }

    #[test]
    fn dead_unit_cannot_take_a_turn() {
        let mut world = world("#E.G#");
        let mut resolver = TurnResolver::new();
        let mut events = Vec::new();

        let result = resolver.take_turn(&mut world, UnitId::new(7), &mut events);

        assert_eq!(result, Err(RuleViolation::UnknownUnit { unit: UnitId::new(7) }));
    }
}
