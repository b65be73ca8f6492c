//! Type definitions

pub mod job;
pub mod matching;

pub use job::*;
pub use matching::*;

use serde::{Deserialize, Serialize};

/// Geographic coordinates (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordinates as a `[lat, lng]` pair, the order used in result payloads.
    pub fn as_pair(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}
