//! Breadth-first distance field over the passable cells of a grid.

use std::collections::VecDeque;

use skirmish_core::CellCoord;

const UNREACHABLE: u32 = u32::MAX;

/// Dense step-count grid produced by a breadth-first search.
///
/// Sources are seeded at distance zero even when they are not passable, so a
/// search can start from the cell a unit is standing on. Every other cell is
/// entered only when the passability predicate accepts it.
#[derive(Clone, Debug, Default)]
pub struct DistanceField {
    rows: u32,
    columns: u32,
    distances: Vec<u32>,
    queue: VecDeque<CellCoord>,
}

impl DistanceField {
    /// Rebuilds the distances outward from `sources`.
    pub fn rebuild_with<F>(&mut self, rows: u32, columns: u32, sources: &[CellCoord], is_passable: F)
    where
        F: Fn(CellCoord) -> bool,
    {
        let width = usize::try_from(columns).unwrap_or(0);
        let height = usize::try_from(rows).unwrap_or(0);
        let cell_count = width.checked_mul(height).unwrap_or(0);

        self.rows = rows;
        self.columns = columns;
        self.queue.clear();

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        if self.distances.len() != cell_count {
            self.distances = vec![UNREACHABLE; cell_count];
        } else {
            self.distances.fill(UNREACHABLE);
        }

        for &source in sources {
            let Some(index) = index(width, rows, columns, source) else {
                continue;
            };
            if self.distances[index] == 0 {
                continue;
            }
            self.distances[index] = 0;
            self.queue.push_back(source);
        }

        while let Some(cell) = self.queue.pop_front() {
            let Some(current_index) = index(width, rows, columns, cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in cell.neighbors(rows, columns) {
                if !is_passable(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = index(width, rows, columns, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                self.queue.push_back(neighbor);
            }
        }
    }

    /// Steps needed to reach the cell, or `None` when it is unreachable or out of bounds.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        let width = usize::try_from(self.columns).ok()?;
        index(width, self.rows, self.columns, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != UNREACHABLE)
    }
}

fn index(width: usize, rows: u32, columns: u32, cell: CellCoord) -> Option<usize> {
    if cell.row() >= rows || cell.column() >= columns {
        return None;
    }
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
