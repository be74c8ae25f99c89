//! Move history stack.
//!
//! Each committed maneuver pushes a record; the backtrack maneuver pops the
//! most recent one. The stack is audit-only: it is never replayed to drive
//! an actual reverse route.

/// A committed discrete maneuver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// One completed cell-advance
    Advance,
    /// Committed 90° left turn
    TurnLeft,
    /// Committed 90° right turn
    TurnRight,
    /// Committed 180° reversal
    Backtrack,
}

/// Stack of committed moves
#[derive(Debug, Default)]
pub struct PathMemory {
    moves: Vec<Move>,
}

impl PathMemory {
    pub fn new() -> Self {
        Self { moves: Vec::new() }
    }

    /// Record a committed move
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    /// Remove and return the most recent move, or `None` when empty.
    ///
    /// Popping an empty stack mutates nothing.
    pub fn pop(&mut self) -> Option<Move> {
        self.moves.pop()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Recorded moves, oldest first
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }
}
