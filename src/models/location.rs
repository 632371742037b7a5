//! Integer grid locations.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Grid coordinate type.
pub type Coord = i32;

/// A point on the integer grid.
///
/// Locations are totally ordered by `x`, then `y`. That order is the
/// iteration order of facilities in a [`Network`](super::Network).
///
/// # Examples
///
/// ```
/// use u_logistics::models::Location;
///
/// let a = Location::new(1, 5);
/// let b = Location::new(2, 0);
/// assert!(a < b);
/// assert_eq!(b - a, Location::new(1, -5));
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Location {
    pub x: Coord,
    pub y: Coord,
}

impl Location {
    /// Creates a location at `(x, y)`.
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

impl Add for Location {
    type Output = Location;

    fn add(self, rhs: Location) -> Location {
        Location::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Location {
    type Output = Location;

    fn sub(self, rhs: Location) -> Location {
        Location::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(Coord, Coord)> for Location {
    fn from((x, y): (Coord, Coord)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
