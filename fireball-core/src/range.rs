use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{BUFFER_DEG, TENTHS_PER_DEG};
use crate::coordinate::{parse_degree, Coordinate};

/// Rounds the exact binary value to one decimal place, ties to even.
///
/// `22.65` is stored just below the tie and becomes `22.6`. True ties such
/// as `1.25` go to the even tenth.
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    to_tenths(value) as f64 / TENTHS_PER_DEG
}

/// Nearest whole number of tenths to the exact value of `value`, ties to even.
fn to_tenths(value: f64) -> i64 {
    let bits = value.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = (bits & ((1u64 << 52) - 1)) as i128;
    // value == mantissa * 2^exp exactly
    let (mantissa, exp) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1i128 << 52), exp_bits - 1075)
    };
    let mantissa = if bits >> 63 == 1 { -mantissa } else { mantissa };

    if exp >= 0 {
        // Already a whole number of degrees.
        return (value * TENTHS_PER_DEG) as i64;
    }
    let shift = -exp;
    // |value * 10| < 2^57 * 2^-120, which rounds to zero.
    if shift > 120 {
        return 0;
    }
    let scaled = mantissa * 10;
    let floor = scaled >> shift;
    let remainder = scaled - (floor << shift);
    let half = 1i128 << (shift - 1);
    let rounded = if remainder > half || (remainder == half && floor & 1 == 1) {
        floor + 1
    } else {
        floor
    };
    rounded as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn around(center: f64, buffer: f64) -> Self {
        Interval {
            low: round1(center - buffer),
            high: round1(center + buffer),
        }
    }
}

/// Candidate values at 0.1 degree resolution over `[low, high)`.
///
/// Stored as integer tenths so stepping never drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    start: i64,
    end: i64,
}

impl Grid {
    pub fn empty() -> Self {
        Grid::default()
    }

    pub fn spanning(interval: &Interval) -> Self {
        let start = to_tenths(interval.low);
        let end = to_tenths(interval.high).max(start);
        Grid { start, end }
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn first(&self) -> Option<f64> {
        self.values().next()
    }

    pub fn last(&self) -> Option<f64> {
        self.values().next_back()
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = f64> {
        (self.start..self.end).map(|t| t as f64 / TENTHS_PER_DEG)
    }

    /// Membership of `value` rounded to one decimal place.
    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let t = to_tenths(value);
        t >= self.start && t < self.end
    }
}

/// The search window for one axis of a query.
///
/// Unparseable input leaves `interval` unset and `grid` empty, so nothing
/// matches on this axis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisRange {
    pub axis: Axis,
    pub input: String,
    pub coordinate: Option<Coordinate>,
    pub interval: Option<Interval>,
    #[serde(skip)]
    pub grid: Grid,
    pub error: Option<String>,
}

impl AxisRange {
    pub fn from_input(axis: Axis, raw: &str) -> Self {
        match parse_degree(raw) {
            Ok(coordinate) => {
                let interval = Interval::around(coordinate.degrees, BUFFER_DEG);
                let grid = Grid::spanning(&interval);
                debug!(
                    "{} {:?} -> [{:.1}, {:.1}) ({} cells)",
                    axis,
                    raw,
                    interval.low,
                    interval.high,
                    grid.len()
                );
                AxisRange {
                    axis,
                    input: raw.to_string(),
                    coordinate: Some(coordinate),
                    interval: Some(interval),
                    grid,
                    error: None,
                }
            }
            Err(err) => {
                warn!("{} left empty: {}", axis, err);
                AxisRange {
                    axis,
                    input: raw.to_string(),
                    coordinate: None,
                    interval: None,
                    grid: Grid::empty(),
                    error: Some(err.to_string()),
                }
            }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.grid.contains(value)
    }

    pub fn is_valid(&self) -> bool {
        self.interval.is_some()
    }
}
