//! Reactive maze navigation: wall-following state machine, dead-reckoned
//! pose tracking and gyro-based heading hold.

pub mod encoder;
pub mod grid;
pub mod heading;
pub mod machine;
pub mod path;
pub mod perception;
pub mod pose;

pub use encoder::{EncoderBank, EncoderSnapshot};
pub use grid::DistanceField;
pub use heading::HeadingController;
pub use machine::{NavState, Navigator};
pub use path::{Move, PathMemory};
pub use perception::{PerceptionSampler, WallReadings};
pub use pose::{Heading, Pose, GRID_MAX};
