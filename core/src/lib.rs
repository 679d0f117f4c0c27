#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish combat simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems inspect read-only views of
//! the world and respond with [`Command`] values describing the mutation a
//! unit wants to perform. The world validates and executes those commands via
//! its `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Commands that break the rules of combat are rejected with a
//! [`RuleViolation`], which callers treat as fatal.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hit points every unit starts the simulation with.
pub const DEFAULT_HIT_POINTS: i32 = 200;

/// Attack power applied to a faction unless overridden before the simulation starts.
pub const DEFAULT_ATTACK_POWER: u32 = 3;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Requests that a unit step into an adjacent open cell.
    MoveUnit {
        /// Identifier of the unit attempting to move.
        unit: UnitId,
        /// Adjacent cell the unit wants to occupy.
        to: CellCoord,
    },
    /// Requests that a unit strike an adjacent enemy.
    Attack {
        /// Identifier of the unit performing the attack.
        attacker: UnitId,
        /// Identifier of the enemy receiving the blow.
        target: UnitId,
    },
}

/// Events broadcast by the world and the round scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that a unit moved between two adjacent cells.
    UnitMoved {
        /// Identifier of the unit that moved.
        unit: UnitId,
        /// Cell the unit occupied before moving.
        from: CellCoord,
        /// Cell the unit occupies after moving.
        to: CellCoord,
    },
    /// Confirms that an attack landed.
    UnitAttacked {
        /// Identifier of the attacking unit.
        attacker: UnitId,
        /// Identifier of the unit that was hit.
        target: UnitId,
        /// Hit points removed by the attack.
        damage: u32,
        /// Hit points the target has left; zero or below means it died.
        remaining: i32,
    },
    /// Announces that a unit was removed from the battlefield.
    UnitDied {
        /// Identifier of the unit that died.
        unit: UnitId,
        /// Faction the unit fought for.
        faction: Faction,
        /// Cell the unit occupied when it died.
        cell: CellCoord,
    },
    /// Announces that every unit alive at the start of a round has acted.
    RoundCompleted {
        /// One-based index of the round that completed.
        round: u32,
    },
    /// Announces that one faction has been eliminated.
    CombatEnded {
        /// Number of rounds that completed in full before combat ended.
        rounds: u32,
        /// Faction left standing.
        winner: Faction,
    },
}

/// One of the two opposing groups fighting on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Units marked with `E` on the map.
    Elf,
    /// Units marked with `G` on the map.
    Goblin,
}

impl Faction {
    /// Returns the faction this faction fights against.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Elf => Self::Goblin,
            Self::Goblin => Self::Elf,
        }
    }

    /// Character used to mark the faction's units on a map.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Elf => 'E',
            Self::Goblin => 'G',
        }
    }

    /// Resolves the faction marked by the provided map character, if any.
    #[must_use]
    pub const fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'E' => Some(Self::Elf),
            'G' => Some(Self::Goblin),
            _ => None,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elf => write!(f, "elves"),
            Self::Goblin => write!(f, "goblins"),
        }
    }
}

/// Unique identifier assigned to a unit when the map is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
///
/// The derived ordering compares the row first and the column second, which
/// is reading order: top to bottom, then left to right. Every tie-break in the
/// simulator relies on this ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row().abs_diff(other.row()) + self.column().abs_diff(other.column())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Enumerates the in-bounds cells sharing an edge with this one.
    ///
    /// Cells are yielded up, left, right, down, which coincides with reading
    /// order.
    #[must_use]
    pub fn neighbors(self, rows: u32, columns: u32) -> Neighbors {
        let mut neighbors = Neighbors::default();

        if self.row > 0 {
            neighbors.push(CellCoord::new(self.row - 1, self.column));
        }
        if self.column > 0 {
            neighbors.push(CellCoord::new(self.row, self.column - 1));
        }
        if self.column.saturating_add(1) < columns {
            neighbors.push(CellCoord::new(self.row, self.column + 1));
        }
        if self.row.saturating_add(1) < rows {
            neighbors.push(CellCoord::new(self.row + 1, self.column));
        }

        neighbors
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Iterator over at most four neighbouring cells, stored inline.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Attack power assigned to each faction for the duration of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackPowers {
    elf: u32,
    goblin: u32,
}

impl AttackPowers {
    /// Creates an explicit attack power assignment.
    #[must_use]
    pub const fn new(elf: u32, goblin: u32) -> Self {
        Self { elf, goblin }
    }

    /// Returns a copy with one faction's attack power replaced.
    #[must_use]
    pub const fn with_override(self, faction: Faction, power: u32) -> Self {
        match faction {
            Faction::Elf => Self { elf: power, ..self },
            Faction::Goblin => Self {
                goblin: power,
                ..self
            },
        }
    }

    /// Attack power wielded by units of the provided faction.
    #[must_use]
    pub const fn of(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Elf => self.elf,
            Faction::Goblin => self.goblin,
        }
    }
}

impl Default for AttackPowers {
    fn default() -> Self {
        Self::new(DEFAULT_ATTACK_POWER, DEFAULT_ATTACK_POWER)
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Grid cell currently occupied by the unit.
    pub cell: CellCoord,
    /// Hit points the unit has left.
    pub hit_points: i32,
    /// Damage the unit deals per attack.
    pub attack_power: u32,
}

/// Read-only snapshot describing all living units, in reading order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view, ordering the snapshots by position.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.cell);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in reading order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided unit.
    #[must_use]
    pub fn get(&self, unit: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == unit)
    }

    /// Iterator over the living units fighting for the provided faction.
    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.faction == faction)
    }

    /// Number of captured units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view into the dense occupancy index.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    cells: &'a [Option<UnitId>],
    rows: u32,
    columns: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [Option<UnitId>], rows: u32, columns: u32) -> Self {
        Self {
            cells,
            rows,
            columns,
        }
    }

    /// Returns the unit occupying the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<UnitId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether no unit stands on the cell.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_none()
    }

    /// Provides the dimensions of the underlying occupancy grid as `(rows, columns)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
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
}

/// Number of units each faction lost during a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Casualties {
    /// Elves that died.
    pub elves: u32,
    /// Goblins that died.
    pub goblins: u32,
}

impl Casualties {
    /// Casualties suffered by the provided faction.
    #[must_use]
    pub const fn of(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Elf => self.elves,
            Faction::Goblin => self.goblins,
        }
    }

    /// Records one more death for the provided faction.
    pub fn record(&mut self, faction: Faction) {
        match faction {
            Faction::Elf => self.elves = self.elves.saturating_add(1),
            Faction::Goblin => self.goblins = self.goblins.saturating_add(1),
        }
    }
}

/// Final result of a simulation that ran until one faction was eliminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatOutcome {
    /// Rounds that completed in full before combat ended.
    pub rounds: u32,
    /// Hit points summed over every surviving unit.
    pub remaining_hit_points: i64,
    /// Faction left standing.
    pub winner: Faction,
    /// Units each faction lost.
    pub casualties: Casualties,
}

impl CombatOutcome {
    /// Score reported for the combat: completed rounds times remaining hit points.
    #[must_use]
    pub fn score(&self) -> i64 {
        i64::from(self.rounds) * self.remaining_hit_points
    }
}

/// Commands that break the rules of combat.
///
/// The systems never emit these when driven correctly, so receiving one means
/// the turn state machine is defective and the simulation must stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    /// The command referenced a unit that is not alive.
    #[error("unit {unit} is not alive")]
    UnknownUnit {
        /// Identifier that failed to resolve.
        unit: UnitId,
    },
    /// A move targeted a cell that does not share an edge with the unit.
    #[error("unit {unit} cannot move from {from} to non-adjacent cell {to}")]
    MoveNotAdjacent {
        /// Unit attempting the move.
        unit: UnitId,
        /// Cell the unit occupies.
        from: CellCoord,
        /// Requested destination.
        to: CellCoord,
    },
    /// A move targeted a wall or a cell outside the battlefield.
    #[error("unit {unit} cannot move into blocked cell {to}")]
    MoveIntoWall {
        /// Unit attempting the move.
        unit: UnitId,
        /// Requested destination.
        to: CellCoord,
    },
    /// A move targeted a cell another unit stands on.
    #[error("unit {unit} cannot move into {to}, occupied by unit {occupant}")]
    MoveIntoOccupied {
        /// Unit attempting the move.
        unit: UnitId,
        /// Requested destination.
        to: CellCoord,
        /// Unit standing on the destination.
        occupant: UnitId,
    },
    /// An attack targeted a unit of the attacker's own faction.
    #[error("unit {attacker} cannot attack friendly unit {target}")]
    FriendlyFire {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Friendly unit named as the target.
        target: UnitId,
    },
    /// An attack targeted a unit that does not share an edge with the attacker.
    #[error("unit {attacker} cannot reach unit {target}")]
    TargetOutOfReach {
        /// Unit performing the attack.
        attacker: UnitId,
        /// Unit named as the target.
        target: UnitId,
    },
    /// A unit entered its attack phase without any enemy beside it.
    #[error("unit {attacker} has no enemy within reach")]
    NoTargetInReach {
        /// Unit that was due to attack.
        attacker: UnitId,
    },
}
