//! Uniform-cell spatial hash for broad-phase pruning
//!
//! Maps integer cell coordinates to the bodies whose AABB footprint overlaps
//! the cell. Rebuilt fully every tick - no incremental diffing, rebuild cost
//! is linear in total AABB-cell overlaps.
//!
//! This is a pure pruning structure: queries may return false positives but
//! never omit a truly overlapping pair.

use std::collections::HashMap;

use super::collider::Aabb;
use crate::consts;

pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(consts::CELL_SIZE)
    }
}

impl SpatialGrid {
    /// `cell_size` trades candidate-set precision against grid memory;
    /// non-positive sizes are clamped to a small positive cell.
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(consts::GEOM_EPSILON),
            cells: HashMap::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Clear all cells, retaining allocations for reuse
    pub fn clear(&mut self) {
        for occupants in self.cells.values_mut() {
            occupants.clear();
        }
    }

    /// Inclusive cell-coordinate range covered by an AABB
    fn cell_range(&self, bounds: &Aabb) -> (i32, i32, i32, i32) {
        (
            (bounds.min.x / self.cell_size).floor() as i32,
            (bounds.min.y / self.cell_size).floor() as i32,
            (bounds.max.x / self.cell_size).floor() as i32,
            (bounds.max.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a body index into every cell its bounds overlap
    pub fn insert(&mut self, index: usize, bounds: &Aabb) {
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        for x in x0..=x1 {
            for y in y0..=y1 {
                self.cells.entry((x, y)).or_default().push(index);
            }
        }
    }

    /// Clear and reinsert every body's footprint
    pub fn rebuild(&mut self, items: impl IntoIterator<Item = (usize, Aabb)>) {
        self.clear();
        for (index, bounds) in items {
            self.insert(index, &bounds);
        }
    }

    /// All body indices sharing any cell with `bounds`, excluding `skip`.
    ///
    /// The result is deduplicated and sorted (stable order keeps the
    /// downstream pipeline deterministic).
    pub fn query(&self, bounds: &Aabb, skip: usize) -> Vec<usize> {
        let (x0, y0, x1, y1) = self.cell_range(bounds);
        let mut nearby = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(occupants) = self.cells.get(&(x, y)) {
                    nearby.extend(occupants.iter().copied().filter(|&i| i != skip));
                }
            }
        }
        nearby.sort_unstable();
        nearby.dedup();
        nearby
    }
}
