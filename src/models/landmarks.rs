use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A landmark in the detector's normalized coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// One detector tick: the ordered landmark set plus the moment it was captured.
///
/// Indices into `landmarks` are a contract with the detector (see
/// [`LandmarkIndices`](crate::analysis::LandmarkIndices)).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub captured_at: DateTime<Utc>,
    pub landmarks: Vec<Point>,
}

impl Sample {
    pub fn new(captured_at: DateTime<Utc>, landmarks: Vec<Point>) -> Self {
        Self {
            captured_at,
            landmarks,
        }
    }
}
