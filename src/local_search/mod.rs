//! Local search operators for improving finished networks.
//!
//! - [`splice_routes`] — merge two routes at a shared stop
//! - [`randomly_splice`] / [`multi_splice`] — random splice moves over a [`SharedStops`] index
//! - [`fully_polish`] — best-K beam search over multi-splice moves

mod polish;
mod splice;

pub use polish::{fully_polish, Polished};
pub use splice::{multi_splice, randomly_splice, splice_routes, SharedStops};
