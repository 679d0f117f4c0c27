#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering of the battlefield and its units for console adapters.

use std::fmt;

use skirmish_core::{CellCoord, Faction, OccupancyView, UnitView};
use skirmish_world::{query, Tile, World};

const WALL_GLYPH: char = '#';
const OPEN_GLYPH: char = '.';

/// Unit annotation printed beside the row it stands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitLabel {
    /// Faction the unit fights for.
    pub faction: Faction,
    /// Hit points the unit has left.
    pub hit_points: i32,
}

impl fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.faction.marker(), self.hit_points)
    }
}

/// Single rendered row of the battlefield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRow {
    /// Glyphs for every cell on the row.
    pub cells: String,
    /// Units standing on the row, left to right.
    pub units: Vec<UnitLabel>,
}

/// Snapshot of the battlefield as text, one row per line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    rows: Vec<FrameRow>,
}

impl Frame {
    /// Captures the current terrain and unit positions of the world.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let battlefield = query::battlefield(world);
        let units = query::unit_view(world);
        let occupancy = query::occupancy_view(world);

        let rows = (0..battlefield.rows())
            .map(|row| {
                let cells = (0..battlefield.columns())
                    .map(|column| {
                        let cell = CellCoord::new(row, column);
                        glyph(&units, &occupancy, cell, battlefield.tile(cell))
                    })
                    .collect();
                let units = units
                    .iter()
                    .filter(|unit| unit.cell.row() == row)
                    .map(|unit| UnitLabel {
                        faction: unit.faction,
                        hit_points: unit.hit_points,
                    })
                    .collect();
                FrameRow { cells, units }
            })
            .collect();

        Self { rows }
    }

    /// Rendered rows from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }
}

fn glyph(
    units: &UnitView,
    occupancy: &OccupancyView<'_>,
    cell: CellCoord,
    tile: Option<Tile>,
) -> char {
    if let Some(unit) = occupancy.occupant(cell).and_then(|id| units.get(id)) {
        return unit.faction.marker();
    }
    match tile {
        Some(Tile::Open) => OPEN_GLYPH,
        Some(Tile::Wall) | None => WALL_GLYPH,
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            f.write_str(&row.cells)?;
            for (index, unit) in row.units.iter().enumerate() {
                let separator = if index == 0 { "   " } else { ", " };
                write!(f, "{separator}{unit}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
