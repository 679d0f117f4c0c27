//! Owned collection of living units plus the occupancy index that locates them.

use skirmish_core::{
    AttackPowers, CellCoord, Faction, OccupancyView, UnitId, UnitSnapshot, DEFAULT_HIT_POINTS,
};

use crate::UnitSeed;

/// Combatant placed on the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    faction: Faction,
    cell: CellCoord,
    hit_points: i32,
    attack_power: u32,
}

impl Unit {
    /// Identifier assigned when the map was loaded.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Faction the unit fights for.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Cell the unit currently stands on.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Hit points the unit has left.
    #[must_use]
    pub const fn hit_points(&self) -> i32 {
        self.hit_points
    }

    /// Damage the unit deals per attack.
    #[must_use]
    pub const fn attack_power(&self) -> u32 {
        self.attack_power
    }

    /// Captures an immutable snapshot of the unit.
    #[must_use]
    pub const fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            faction: self.faction,
            cell: self.cell,
            hit_points: self.hit_points,
            attack_power: self.attack_power,
        }
    }
}

/// Living units, kept sorted by identifier, and the cells they occupy.
///
/// The unit list owns all unit data. The occupancy grid only maps cells to
/// identifiers, so a removed unit cannot linger anywhere once both entries
/// are cleared.
#[derive(Clone, Debug)]
pub struct UnitRegistry {
    units: Vec<Unit>,
    occupancy: OccupancyGrid,
}

impl UnitRegistry {
    /// Places one unit per seed, numbering them in seed order.
    #[must_use]
    pub fn from_seeds(rows: u32, columns: u32, seeds: &[UnitSeed], powers: AttackPowers) -> Self {
        let units: Vec<Unit> = (0u32..)
            .zip(seeds.iter())
            .map(|(index, seed)| Unit {
                id: UnitId::new(index),
                faction: seed.faction,
                cell: seed.cell,
                hit_points: DEFAULT_HIT_POINTS,
                attack_power: powers.of(seed.faction),
            })
            .collect();
        let mut occupancy = OccupancyGrid::new(rows, columns);
        occupancy.fill_with(&units);
        Self { units, occupancy }
    }

    /// Snapshots of every living unit in reading order of their positions.
    ///
    /// The order is recomputed on every call because positions change as
    /// units move.
    #[must_use]
    pub fn living_units(&self) -> Vec<UnitSnapshot> {
        let mut snapshots: Vec<UnitSnapshot> = self.units.iter().map(Unit::snapshot).collect();
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        snapshots
    }

    /// Looks up a living unit by identifier.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&Unit> {
        self.position(unit).map(|index| &self.units[index])
    }

    /// Identifier of the unit standing on the cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.occupancy.occupant(cell)
    }

    /// Reports whether a living unit stands on the cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_some()
    }

    /// Removes the unit, returning it if it was still alive.
    ///
    /// Removing a unit that is already gone is a no-op.
    pub fn remove(&mut self, unit: UnitId) -> Option<Unit> {
        let index = self.position(unit)?;
        let removed = self.units.remove(index);
        self.occupancy.vacate(removed.cell, removed.id);
        Some(removed)
    }

    /// Sum of the hit points of every living unit.
    #[must_use]
    pub fn total_hit_points(&self) -> i64 {
        self.units
            .iter()
            .map(|unit| i64::from(unit.hit_points))
            .sum()
    }

    /// Sum of the hit points of the faction's living units.
    #[must_use]
    pub fn hit_points(&self, faction: Faction) -> i64 {
        self.units
            .iter()
            .filter(|unit| unit.faction == faction)
            .map(|unit| i64::from(unit.hit_points))
            .sum()
    }

    /// Number of living units fighting for the faction.
    #[must_use]
    pub fn count(&self, faction: Faction) -> usize {
        self.units
            .iter()
            .filter(|unit| unit.faction == faction)
            .count()
    }

    /// Number of living units across both factions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Reports whether every unit has died.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Exposes a read-only view of the occupancy index.
    #[must_use]
    pub fn occupancy_view(&self) -> OccupancyView<'_> {
        OccupancyView::new(
            self.occupancy.cells(),
            self.occupancy.rows,
            self.occupancy.columns,
        )
    }

    pub(crate) fn relocate(&mut self, unit: UnitId, to: CellCoord) -> Option<CellCoord> {
        let index = self.position(unit)?;
        let entry = &mut self.units[index];
        let from = entry.cell;
        self.occupancy.vacate(from, unit);
        self.occupancy.occupy(unit, to);
        entry.cell = to;
        Some(from)
    }

    pub(crate) fn damage(&mut self, unit: UnitId, amount: u32) -> Option<i32> {
        let index = self.position(unit)?;
        let entry = &mut self.units[index];
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        entry.hit_points = entry.hit_points.saturating_sub(amount);
        Some(entry.hit_points)
    }

    fn position(&self, unit: UnitId) -> Option<usize> {
        self.units
            .binary_search_by_key(&unit, |entry| entry.id)
            .ok()
    }
}

#[derive(Clone, Debug)]
struct OccupancyGrid {
    rows: u32,
    columns: u32,
    cells: Vec<Option<UnitId>>,
}

impl OccupancyGrid {
    fn new(rows: u32, columns: u32) -> Self {
        let capacity_u64 = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            rows,
            columns,
            cells: vec![None; capacity],
        }
    }

    fn fill_with(&mut self, units: &[Unit]) {
        self.cells.fill(None);
        for unit in units {
            self.occupy(unit.id, unit.cell);
        }
    }

    fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    fn occupy(&mut self, unit: UnitId, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(unit);
            }
        }
    }

    fn vacate(&mut self, cell: CellCoord, unit: UnitId) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                if *slot == Some(unit) {
                    *slot = None;
                }
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.row() < self.rows && cell.column() < self.columns {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    fn cells(&self) -> &[Option<UnitId>] {
        &self.cells
    }
}
