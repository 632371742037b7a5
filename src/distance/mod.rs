//! Grid travel distances.
//!
//! Travel between two [`Location`](crate::models::Location)s follows the
//! grid with straight and diagonal moves, so a distance is kept exactly as
//! a count of straight steps plus a count of diagonal steps.

mod octile;

pub use octile::{distance, Distance};
