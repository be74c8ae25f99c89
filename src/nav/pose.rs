//! Grid pose tracking.
//!
//! Dead-reckoned cell coordinates plus a discrete 90°-quantized heading.
//! The pose is advanced exactly once per completed cell-advance, using the
//! heading committed at that instant.

/// Grid bounds: cells span [0, 7] on both axes.
pub const GRID_MAX: u8 = 7;

/// Discrete heading, quantized to the four grid directions.
///
/// Degree values follow the maze convention: 0° advances the column,
/// 90° decrements the row, 180° decrements the column, 270° increments
/// the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    East,
    North,
    West,
    South,
}

impl Heading {
    /// Heading from a degree value (must be 0, 90, 180 or 270)
    pub fn from_degrees(deg: u16) -> Option<Self> {
        match deg {
            0 => Some(Heading::East),
            90 => Some(Heading::North),
            180 => Some(Heading::West),
            270 => Some(Heading::South),
            _ => None,
        }
    }

    /// Degree value in [0, 360)
    pub fn degrees(self) -> u16 {
        match self {
            Heading::East => 0,
            Heading::North => 90,
            Heading::West => 180,
            Heading::South => 270,
        }
    }

    /// Heading after a 90° right (clockwise) turn
    pub fn right(self) -> Self {
        match self {
            Heading::East => Heading::South,
            Heading::North => Heading::East,
            Heading::West => Heading::North,
            Heading::South => Heading::West,
        }
    }

    /// Heading after a 90° left (counter-clockwise) turn
    pub fn left(self) -> Self {
        match self {
            Heading::East => Heading::North,
            Heading::North => Heading::West,
            Heading::West => Heading::South,
            Heading::South => Heading::East,
        }
    }

    /// Heading after a 180° reversal
    pub fn reverse(self) -> Self {
        self.right().right()
    }
}

/// Dead-reckoned grid pose
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pose {
    /// Cell column, clamped to [0, 7]
    pub cell_x: u8,
    /// Cell row, clamped to [0, 7]
    pub cell_y: u8,
    /// Discrete heading
    pub heading: Heading,
}

impl Pose {
    pub fn new(cell_x: u8, cell_y: u8, heading: Heading) -> Self {
        Self {
            cell_x: cell_x.min(GRID_MAX),
            cell_y: cell_y.min(GRID_MAX),
            heading,
        }
    }

    /// Advance one cell in the current heading, clamping to the grid.
    ///
    /// Exactly one coordinate changes by ±1, unless already at a bound.
    pub fn advance(&mut self) {
        match self.heading {
            Heading::East => self.cell_x = (self.cell_x + 1).min(GRID_MAX),
            Heading::North => self.cell_y = self.cell_y.saturating_sub(1),
            Heading::West => self.cell_x = self.cell_x.saturating_sub(1),
            Heading::South => self.cell_y = (self.cell_y + 1).min(GRID_MAX),
        }
    }

    /// Commit a completed right turn
    pub fn turn_right(&mut self) {
        self.heading = self.heading.right();
    }

    /// Commit a completed left turn
    pub fn turn_left(&mut self) {
        self.heading = self.heading.left();
    }

    /// Commit a completed 180° reversal
    pub fn reverse(&mut self) {
        self.heading = self.heading.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_degrees_round_trip() {
        for deg in [0u16, 90, 180, 270] {
            let h = Heading::from_degrees(deg).unwrap();
            assert_eq!(h.degrees(), deg);
        }
        assert!(Heading::from_degrees(45).is_none());
        assert!(Heading::from_degrees(360).is_none());
    }

    #[test]
    fn test_turns() {
        assert_eq!(Heading::North.right(), Heading::East);
        assert_eq!(Heading::North.left(), Heading::West);
        assert_eq!(Heading::North.reverse(), Heading::South);
        assert_eq!(Heading::East.right(), Heading::South);
        assert_eq!(Heading::East.left(), Heading::North);
        // four rights come back around
        let h = Heading::West;
        assert_eq!(h.right().right().right().right(), h);
    }

    #[test]
    fn test_advance_changes_exactly_one_coordinate() {
        for heading in [Heading::East, Heading::North, Heading::West, Heading::South] {
            let mut pose = Pose::new(4, 4, heading);
            let before = pose;
            pose.advance();
            let dx = pose.cell_x as i16 - before.cell_x as i16;
            let dy = pose.cell_y as i16 - before.cell_y as i16;
            assert_eq!(dx.abs() + dy.abs(), 1, "heading {:?}", heading);
            assert!(pose.cell_x <= GRID_MAX && pose.cell_y <= GRID_MAX);
        }
    }

    #[test]
    fn test_advance_directions() {
        let mut pose = Pose::new(4, 4, Heading::East);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (5, 4));

        let mut pose = Pose::new(4, 4, Heading::North);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (4, 3));

        let mut pose = Pose::new(4, 4, Heading::West);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (3, 4));

        let mut pose = Pose::new(4, 4, Heading::South);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (4, 5));
    }

    #[test]
    fn test_advance_clamps_at_bounds() {
        let mut pose = Pose::new(7, 0, Heading::North);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (7, 0));

        let mut pose = Pose::new(7, 7, Heading::East);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (7, 7));

        let mut pose = Pose::new(0, 0, Heading::West);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (0, 0));

        let mut pose = Pose::new(0, 7, Heading::South);
        pose.advance();
        assert_eq!((pose.cell_x, pose.cell_y), (0, 7));
    }

    #[test]
    fn test_turn_commits() {
        let mut pose = Pose::new(3, 3, Heading::North);
        pose.turn_right();
        assert_eq!(pose.heading, Heading::East);
        pose.turn_left();
        assert_eq!(pose.heading, Heading::North);
        pose.reverse();
        assert_eq!(pose.heading, Heading::South);
        // position untouched by turns
        assert_eq!((pose.cell_x, pose.cell_y), (3, 3));
    }
}
