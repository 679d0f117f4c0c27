#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield and unit state for Skirmish.

mod battlefield;
mod registry;

pub use battlefield::{Battlefield, MapError, Tile, UnitSeed};
pub use registry::{Unit, UnitRegistry};

use skirmish_core::{AttackPowers, CellCoord, Command, Event, RuleViolation, UnitId};

/// Represents the authoritative Skirmish world state.
#[derive(Clone, Debug)]
pub struct World {
    battlefield: Battlefield,
    registry: UnitRegistry,
}

impl World {
    /// Builds a world from terrain and the units discovered on it.
    #[must_use]
    pub fn new(battlefield: Battlefield, seeds: &[UnitSeed], powers: AttackPowers) -> Self {
        let registry =
            UnitRegistry::from_seeds(battlefield.rows(), battlefield.columns(), seeds, powers);
        Self {
            battlefield,
            registry,
        }
    }

    /// Parses a map and places its units with the provided attack powers.
    pub fn from_map(text: &str, powers: AttackPowers) -> Result<Self, MapError> {
        let (battlefield, seeds) = Battlefield::parse(text)?;
        Ok(Self::new(battlefield, &seeds, powers))
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands that break the rules of movement or combat leave the world
/// untouched and are reported as a [`RuleViolation`].
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), RuleViolation> {
    match command {
        Command::MoveUnit { unit, to } => move_unit(world, unit, to, out_events),
        Command::Attack { attacker, target } => attack(world, attacker, target, out_events),
    }
}

fn move_unit(
    world: &mut World,
    unit: UnitId,
    to: CellCoord,
    out_events: &mut Vec<Event>,
) -> Result<(), RuleViolation> {
    let from = world
        .registry
        .get(unit)
        .map(Unit::cell)
        .ok_or(RuleViolation::UnknownUnit { unit })?;

    if !from.is_adjacent_to(to) {
        return Err(RuleViolation::MoveNotAdjacent { unit, from, to });
    }
    if !world.battlefield.is_open(to) {
        return Err(RuleViolation::MoveIntoWall { unit, to });
    }
    if let Some(occupant) = world.registry.occupant(to) {
        return Err(RuleViolation::MoveIntoOccupied { unit, to, occupant });
    }

    let _ = world.registry.relocate(unit, to);
    tracing::trace!(%unit, %from, %to, "unit moved");
    out_events.push(Event::UnitMoved { unit, from, to });
    Ok(())
}

fn attack(
    world: &mut World,
    attacker: UnitId,
    target: UnitId,
    out_events: &mut Vec<Event>,
) -> Result<(), RuleViolation> {
    let striker = world
        .registry
        .get(attacker)
        .ok_or(RuleViolation::UnknownUnit { unit: attacker })?;
    let victim = world
        .registry
        .get(target)
        .ok_or(RuleViolation::UnknownUnit { unit: target })?;

    if striker.faction() == victim.faction() {
        return Err(RuleViolation::FriendlyFire { attacker, target });
    }
    if !striker.cell().is_adjacent_to(victim.cell()) {
        return Err(RuleViolation::TargetOutOfReach { attacker, target });
    }

    let damage = striker.attack_power();
    let remaining = world
        .registry
        .damage(target, damage)
        .ok_or(RuleViolation::UnknownUnit { unit: target })?;
    tracing::trace!(%attacker, %target, damage, remaining, "attack landed");
    out_events.push(Event::UnitAttacked {
        attacker,
        target,
        damage,
        remaining,
    });

    if remaining <= 0 {
        if let Some(fallen) = world.registry.remove(target) {
            tracing::debug!(
                unit = %fallen.id(),
                faction = %fallen.faction(),
                cell = %fallen.cell(),
                "unit died"
            );
            out_events.push(Event::UnitDied {
                unit: fallen.id(),
                faction: fallen.faction(),
                cell: fallen.cell(),
            });
        }
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Battlefield, UnitRegistry, World};
    use skirmish_core::{Faction, OccupancyView, UnitView};

    /// Provides read-only access to the static terrain.
    #[must_use]
    pub fn battlefield(world: &World) -> &Battlefield {
        &world.battlefield
    }

    /// Provides read-only access to the living units.
    #[must_use]
    pub fn registry(world: &World) -> &UnitRegistry {
        &world.registry
    }

    /// Captures a read-only view of the living units in reading order.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(world.registry.living_units())
    }

    /// Exposes a read-only view of the occupancy index.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.registry.occupancy_view()
    }

    /// Sum of the hit points of every living unit.
    #[must_use]
    pub fn total_hit_points(world: &World) -> i64 {
        world.registry.total_hit_points()
    }

    /// Number of living units fighting for the faction.
    #[must_use]
    pub fn living_count(world: &World, faction: Faction) -> usize {
        world.registry.count(faction)
    }
}
