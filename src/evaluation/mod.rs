//! Network feasibility checks and cost evaluation.
//!
//! - [`Constraints`] — question-level feasibility and answer-level validity
//! - [`CostFunction`] — weighted sum of structural and load metrics

mod constraints;
mod cost;

pub use constraints::{Constraints, Violation};
pub use cost::{CostFunction, CostWeights, Metric};
