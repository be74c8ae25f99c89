//! Wall perception.
//!
//! One distance reading from each of the three fixed sensors per call, no
//! averaging or filtering. A failed or out-of-range reading is mapped to
//! exactly the wall-detection threshold, which classifies as "wall
//! present" — the conservative default.

use crate::hardware::RangeSensor;
use log::warn;

/// One round of side readings, in integer centimetres
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallReadings {
    pub right_cm: u16,
    pub front_cm: u16,
    pub left_cm: u16,
}

impl WallReadings {
    /// A side is open when its reading is strictly beyond the threshold
    pub fn right_open(&self, threshold_cm: u16) -> bool {
        self.right_cm > threshold_cm
    }

    pub fn front_open(&self, threshold_cm: u16) -> bool {
        self.front_cm > threshold_cm
    }

    pub fn left_open(&self, threshold_cm: u16) -> bool {
        self.left_cm > threshold_cm
    }
}

/// Samples the three fixed range sensors
pub struct PerceptionSampler {
    right: Box<dyn RangeSensor>,
    front: Box<dyn RangeSensor>,
    left: Box<dyn RangeSensor>,
    threshold_cm: u16,
    max_range_cm: u16,
}

impl PerceptionSampler {
    pub fn new(
        right: Box<dyn RangeSensor>,
        front: Box<dyn RangeSensor>,
        left: Box<dyn RangeSensor>,
        threshold_cm: u16,
        max_range_cm: u16,
    ) -> Self {
        Self {
            right,
            front,
            left,
            threshold_cm,
            max_range_cm,
        }
    }

    /// Take one reading per side
    pub fn sample(&mut self) -> WallReadings {
        let threshold = self.threshold_cm;
        let max_range = self.max_range_cm;
        WallReadings {
            right_cm: Self::read_one(self.right.as_mut(), "right", threshold, max_range),
            front_cm: Self::read_one(self.front.as_mut(), "front", threshold, max_range),
            left_cm: Self::read_one(self.left.as_mut(), "left", threshold, max_range),
        }
    }

    fn read_one(
        sensor: &mut dyn RangeSensor,
        side: &str,
        threshold_cm: u16,
        max_range_cm: u16,
    ) -> u16 {
        match sensor.sample() {
            Ok(mm) => {
                let cm = mm / 10;
                if cm > max_range_cm {
                    warn!(
                        "Perception: {} reading {}cm beyond max range, treating as wall",
                        side, cm
                    );
                    threshold_cm
                } else {
                    cm
                }
            }
            Err(e) => {
                warn!("Perception: {} sensor fault ({}), treating as wall", side, e);
                threshold_cm
            }
        }
    }
}
