//! Static map of walkable and blocked cells.

use skirmish_core::{CellCoord, Faction, Neighbors};
use thiserror::Error;

const WALL: char = '#';
const OPEN: char = '.';

/// Kind of terrain covering a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Floor that units may stand on and walk across.
    Open,
    /// Impassable rock.
    Wall,
}

/// Starting position of a unit discovered while scanning the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitSeed {
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Cell the unit starts on.
    pub cell: CellCoord,
}

/// Reasons a map description is rejected before the simulation starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MapError {
    /// The map contained no rows.
    #[error("map is empty")]
    Empty,
    /// A row was shorter or longer than the first row.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: u32,
        /// Column count established by the first row.
        expected: u32,
        /// Column count of the offending row.
        found: u32,
    },
    /// A cell held a character that is neither terrain nor a faction marker.
    #[error("unexpected character {found:?} at row {row}, column {column}")]
    UnexpectedCharacter {
        /// Zero-based row of the offending cell.
        row: u32,
        /// Zero-based column of the offending cell.
        column: u32,
        /// Character that could not be interpreted.
        found: char,
    },
    /// The map is too large to be addressed with 32-bit coordinates.
    #[error("map dimensions exceed the addressable range")]
    TooLarge,
}

/// Immutable terrain of the battlefield, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Battlefield {
    rows: u32,
    columns: u32,
    tiles: Vec<Tile>,
}

impl Battlefield {
    /// Parses a rectangular character grid into terrain and unit seeds.
    ///
    /// `#` marks a wall and `.` open floor. Faction markers become open floor
    /// with a unit seed on top; seeds are returned in reading order. Trailing
    /// blank lines are ignored.
    pub fn parse(text: &str) -> Result<(Self, Vec<UnitSeed>), MapError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            let _ = lines.pop();
        }

        let Some(first) = lines.first() else {
            return Err(MapError::Empty);
        };
        let columns = u32::try_from(first.chars().count()).map_err(|_| MapError::TooLarge)?;
        if columns == 0 {
            return Err(MapError::Empty);
        }
        let rows = u32::try_from(lines.len()).map_err(|_| MapError::TooLarge)?;

        let cell_count = u64::from(rows) * u64::from(columns);
        let capacity = usize::try_from(cell_count).map_err(|_| MapError::TooLarge)?;
        let mut tiles = Vec::with_capacity(capacity);
        let mut seeds = Vec::new();

        for (row, line) in (0..rows).zip(lines.iter()) {
            let found = u32::try_from(line.chars().count()).map_err(|_| MapError::TooLarge)?;
            if found != columns {
                return Err(MapError::RaggedRow {
                    row,
                    expected: columns,
                    found,
                });
            }

            for (column, character) in (0..columns).zip(line.chars()) {
                let tile = match character {
                    WALL => Tile::Wall,
                    OPEN => Tile::Open,
                    marker => {
                        let faction = Faction::from_marker(marker).ok_or(
                            MapError::UnexpectedCharacter {
                                row,
                                column,
                                found: marker,
                            },
                        )?;
                        seeds.push(UnitSeed {
                            faction,
                            cell: CellCoord::new(row, column),
                        });
                        Tile::Open
                    }
                };
                tiles.push(tile);
            }
        }

        Ok((
            Self {
                rows,
                columns,
                tiles,
            },
            seeds,
        ))
    }

    /// Number of rows on the battlefield.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns on the battlefield.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Reports whether the coordinate lies on the battlefield.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Terrain covering the cell, or `None` outside the battlefield.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the cell is in bounds and not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.tile(cell) == Some(Tile::Open)
    }

    /// In-bounds cells sharing an edge with `cell`, ordered up, left, right, down.
    #[must_use]
    pub fn adjacent(&self, cell: CellCoord) -> Neighbors {
        cell.neighbors(self.rows, self.columns)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
