#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic shortest-step planner for units closing in on their enemies.
//!
//! The planner runs two breadth-first searches per query. The first expands
//! from the moving unit and selects the nearest reachable destination,
//! preferring the earliest cell in reading order on ties. The second expands
//! from that destination back toward the unit, which yields the distance from
//! every neighbouring cell of the unit to the destination; the neighbour with
//! the smallest distance, again earliest in reading order on ties, is the step
//! to take. Both searches treat occupied cells as walls.

mod field;

pub use field::DistanceField;

use skirmish_core::CellCoord;

/// Step selected by the planner together with the destination it leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlannedStep {
    /// Adjacent cell the unit should move into.
    pub step: CellCoord,
    /// Destination cell the step begins a shortest path toward.
    pub destination: CellCoord,
    /// Length of the shortest path from the unit to the destination.
    pub distance: u32,
}

/// Breadth-first planner with reusable scratch fields.
#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    outward: DistanceField,
    inward: DistanceField,
}

impl Pathfinder {
    /// Creates a planner with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the first step toward the nearest reachable candidate.
    ///
    /// `is_passable` must accept exactly the open, unoccupied cells. The
    /// origin is always treated as the search start regardless of the
    /// predicate. Returns `None` when no candidate is reachable or when the
    /// origin is itself a candidate.
    pub fn next_step<F>(
        &mut self,
        origin: CellCoord,
        candidates: &[CellCoord],
        dimensions: (u32, u32),
        is_passable: F,
    ) -> Option<PlannedStep>
    where
        F: Fn(CellCoord) -> bool,
    {
        if candidates.is_empty() || candidates.contains(&origin) {
            return None;
        }

        let (rows, columns) = dimensions;
        self.outward
            .rebuild_with(rows, columns, &[origin], &is_passable);

        let (distance, destination) = candidates
            .iter()
            .filter_map(|&candidate| {
                self.outward
                    .distance(candidate)
                    .map(|distance| (distance, candidate))
            })
            .min()?;

        self.inward
            .rebuild_with(rows, columns, &[destination], &is_passable);

        let (_, step) = origin
            .neighbors(rows, columns)
            .filter(|&neighbor| is_passable(neighbor))
            .filter_map(|neighbor| {
                self.inward
                    .distance(neighbor)
                    .map(|remaining| (remaining, neighbor))
            })
            .min()?;

        Some(PlannedStep {
            step,
            destination,
            distance,
        })
    }
}
