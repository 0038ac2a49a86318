//! Simulated Time.
//!
//! All timing in the simulator is expressed as an integer number of
//! picoseconds. Integer arithmetic keeps the timing checker exact: two
//! constraints derived from the same cycle counts always compare equal,
//! which floating point values would not guarantee.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A point or span in simulated time, stored in picoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero (simulation start).
    pub const ZERO: SimTime = SimTime(0);

    /// Creates a time value from picoseconds.
    pub const fn from_ps(ps: u64) -> Self {
        SimTime(ps)
    }

    /// Creates a time value from nanoseconds.
    pub const fn from_ns(ns: u64) -> Self {
        SimTime(ns * 1_000)
    }

    /// Converts a period given in seconds (as found in memspec files) to
    /// picoseconds, rounding to the nearest picosecond.
    pub fn from_secs_f64(secs: f64) -> Self {
        SimTime((secs * 1e12).round().max(0.0) as u64)
    }

    /// Scales a clock period by a (possibly fractional) cycle count.
    ///
    /// Memspec tables occasionally carry fractional cycle counts
    /// (e.g. `RAS: 34.7`), so the product is rounded to the nearest picosecond.
    pub fn cycles(period: SimTime, cycles: f64) -> Self {
        SimTime((period.0 as f64 * cycles).round().max(0.0) as u64)
    }

    /// Returns the raw picosecond value.
    pub const fn as_ps(self) -> u64 {
        self.0
    }

    /// Returns the value in nanoseconds as a float, for reporting.
    pub fn as_ns_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Returns `true` for a zero-length span.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtraction clamped at zero.
    pub const fn saturating_sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }

    /// Raises `self` to at least `other`.
    ///
    /// Every timing-state update goes through this helper so that constraint
    /// entries only ever move forward.
    pub fn raise_to(&mut self, other: SimTime) {
        if other > *self {
            *self = other;
        }
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        self.0 += rhs.0;
    }
}

/// Plain subtraction; panics on underflow in debug builds like integer `-`.
/// Use [`SimTime::saturating_sub`] where the result may be negative.
impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0 - rhs.0)
    }
}

impl Mul<u64> for SimTime {
    type Output = SimTime;

    fn mul(self, rhs: u64) -> SimTime {
        SimTime(self.0 * rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1_000 == 0 {
            write!(f, "{} ns", self.0 / 1_000)
        } else {
            write!(f, "{:.3} ns", self.as_ns_f64())
        }
    }
}
