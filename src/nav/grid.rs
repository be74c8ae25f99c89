//! Static goal-distance field.
//!
//! An 8x8 grid of topological distance-to-goal values. The navigator never
//! plans over it; the only query is whether the current cell's value is
//! zero, which marks the goal.

use super::pose::GRID_MAX;

/// Goal-distance values indexed as `VALUES[row][column]`.
///
/// Goal cells (3,3) and (3,4) hold 0; everything else holds its Manhattan
/// distance to the nearer goal cell.
const VALUES: [[u8; 8]; 8] = [
    [6, 5, 4, 3, 4, 5, 6, 7],
    [5, 4, 3, 2, 3, 4, 5, 6],
    [4, 3, 2, 1, 2, 3, 4, 5],
    [3, 2, 1, 0, 1, 2, 3, 4],
    [3, 2, 1, 0, 1, 2, 3, 4],
    [4, 3, 2, 1, 2, 3, 4, 5],
    [5, 4, 3, 2, 3, 4, 5, 6],
    [6, 5, 4, 3, 4, 5, 6, 7],
];

/// Read-only distance-to-goal oracle
pub struct DistanceField;

impl DistanceField {
    /// Distance value at a cell (coordinates are clamped like the pose)
    pub fn value_at(cell_x: u8, cell_y: u8) -> u8 {
        let x = cell_x.min(GRID_MAX) as usize;
        let y = cell_y.min(GRID_MAX) as usize;
        VALUES[y][x]
    }

    /// True when the cell is a goal cell (distance value 0)
    pub fn is_goal(cell_x: u8, cell_y: u8) -> bool {
        Self::value_at(cell_x, cell_y) == 0
    }
}
