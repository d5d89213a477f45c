use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Bounding box of a detected person, as reported by an upstream detector.
/// `x` and `y` are the top-left corner, all values share the detector's pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn default() -> Self {
        BBox {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }
    pub fn new(_x: f64, _y: f64, _width: f64, _height: f64) -> Self {
        BBox {
            x: _x,
            y: _y,
            width: _width,
            height: _height,
        }
    }
    /// Box can be used as a scale reference: finite coordinates and a strictly positive height
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.height > 0.0
    }
}

impl From<(f64, f64, f64, f64)> for BBox {
    fn from(t: (f64, f64, f64, f64)) -> Self {
        BBox::new(t.0, t.1, t.2, t.3)
    }
}

/// Single detection of a person at a given moment (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub bbox: BBox,
    pub timestamp_ms: i64,
}

impl Observation {
    pub fn new(_bbox: BBox, _timestamp_ms: i64) -> Self {
        Observation {
            bbox: _bbox,
            timestamp_ms: _timestamp_ms,
        }
    }
}

/// Converts a millisecond timestamp into UTC datetime.
/// Falls back to the Unix epoch for values chrono can not represent
pub fn millis_to_datetime(timestamp_ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .unwrap_or_default()
}
