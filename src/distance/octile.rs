//! Octile distance.
//!
//! # Algorithm
//!
//! With `dx = |ax - bx|` and `dy = |ay - by|`, the shortest grid path takes
//! `min(dx, dy)` diagonal steps and `max(dx, dy) - min(dx, dy)` straight
//! steps. Its real length is `straight + diagonal * √2`.
//!
//! # Complexity
//!
//! O(1) per pair.

use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

use crate::models::Location;

/// An exact grid distance: `rational + irrational * √2`.
///
/// Equality is component-wise, ordering is by real value (ties broken by
/// components so the order stays total and consistent with `Eq`).
///
/// # Examples
///
/// ```
/// use u_logistics::distance::{distance, Distance};
/// use u_logistics::models::Location;
///
/// let d = distance(Location::new(0, 0), Location::new(3, 7));
/// assert_eq!(d, Distance::new(4, 3));
/// assert!((d.to_f64() - (4.0 + 3.0 * 2f64.sqrt())).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Distance {
    /// Straight steps.
    pub rational: i64,
    /// Diagonal steps, each worth √2.
    pub irrational: i64,
}

impl Distance {
    /// The zero distance.
    pub const ZERO: Distance = Distance::new(0, 0);

    /// Creates a distance from its straight and diagonal step counts.
    pub const fn new(rational: i64, irrational: i64) -> Self {
        Self {
            rational,
            irrational,
        }
    }

    /// Real-valued length.
    pub fn to_f64(self) -> f64 {
        self.rational as f64 + self.irrational as f64 * std::f64::consts::SQRT_2
    }
}

/// Octile distance between two locations.
pub fn distance(a: Location, b: Location) -> Distance {
    let dx = i64::from(a.x).abs_diff(i64::from(b.x)) as i64;
    let dy = i64::from(a.y).abs_diff(i64::from(b.y)) as i64;
    let (long, short) = if dx >= dy { (dx, dy) } else { (dy, dx) };
    Distance::new(long - short, short)
}

impl Ord for Distance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_f64()
            .total_cmp(&other.to_f64())
            .then(self.rational.cmp(&other.rational))
            .then(self.irrational.cmp(&other.irrational))
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        Distance::new(self.rational + rhs.rational, self.irrational + rhs.irrational)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Distance) {
        *self = *self + rhs;
    }
}

impl Sub for Distance {
    type Output = Distance;

    /// Component-wise difference, negated when its value would be negative.
    fn sub(self, rhs: Distance) -> Distance {
        let diff = Distance::new(self.rational - rhs.rational, self.irrational - rhs.irrational);
        if diff.to_f64() < 0.0 {
            Distance::new(-diff.rational, -diff.irrational)
        } else {
            diff
        }
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Distance>>(iter: I) -> Distance {
        iter.fold(Distance::ZERO, |acc, d| acc + d)
    }
}
