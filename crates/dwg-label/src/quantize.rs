//! Tolerance-grid quantization of coordinates.
//!
//! Near-equal floating-point positions compare equal once both are
//! rounded to the same tolerance grid. This is the sole mechanism for
//! spatial matching; the tolerance is supplied by the caller per
//! comparison and buckets are recomputed per tolerance value.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// Round `v` to the tolerance grid: `round(v / tol) * tol`.
///
/// A zero tolerance disables rounding entirely.
pub fn quantize(v: f64, tolerance: f64) -> f64 {
    if tolerance == 0.0 {
        v
    } else {
        (v / tolerance).round() * tolerance
    }
}

/// A quantized coordinate usable as a map key.
///
/// `-0.0` is normalized to `0.0` at construction so that positions
/// straddling the origin land in one bucket. Ordering is numeric
/// (`f64::total_cmp`), so sorted maps iterate buckets in coordinate
/// order.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub fn new(x: f64, y: f64, tolerance: f64) -> Self {
        Self {
            x: quantize(x, tolerance) + 0.0,
            y: quantize(y, tolerance) + 0.0,
        }
    }

    fn key(&self) -> (u64, u64) {
        (self.x.to_bits(), self.y.to_bits())
    }
}

impl PartialEq for GridPoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GridPoint {}

impl Hash for GridPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Ord for GridPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then(self.y.total_cmp(&other.y))
    }
}

impl PartialOrd for GridPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
