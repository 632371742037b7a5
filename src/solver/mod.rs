//! Network solvers.
//!
//! - [`Solver`] — common surface: feasibility, scoring, junction candidates
//! - [`GreedyEdgeList`] — priority-edge completion followed by splice polish
//! - [`GeneticSolver`] — population search over finished networks

mod genetic;
mod greedy_edge_list;

pub use genetic::GeneticSolver;
pub use greedy_edge_list::GreedyEdgeList;

use crate::constructive::junction_candidates;
use crate::error::SolveError;
use crate::evaluation::{Constraints, CostFunction};
use crate::models::{Location, Network};

/// A strategy that turns a network into a satisfied one.
///
/// Implementors supply the input network, the cost function and the
/// constraints; feasibility checks, scoring and junction candidates come
/// for free.
pub trait Solver {
    /// The network being solved.
    fn network(&self) -> &Network;

    /// The cost function solutions are scored with.
    fn cost_function(&self) -> &CostFunction;

    /// The constraints solutions must pass.
    fn constraints(&self) -> &Constraints;

    /// Solves the network.
    ///
    /// # Errors
    ///
    /// [`SolveError::InfeasibleNetwork`] if supply can't cover demand;
    /// other variants if the search hits a structural impossibility.
    fn solve(&mut self) -> Result<Network, SolveError>;

    /// Returns `true` if aggregate supply covers aggregate demand.
    fn can_solve(&self) -> bool {
        self.constraints().is_valid_network(self.network())
    }

    /// Returns `true` if `net` passes the constraints.
    fn passes_constraints(&self, net: &Network) -> bool {
        self.constraints().check(net)
    }

    /// Cost of `net`.
    fn cost(&self, net: &Network) -> f64 {
        self.cost_function().evaluate(net)
    }

    /// The `count` best junction candidates for the network.
    fn junction_function(&self, count: usize) -> Result<Vec<(Location, usize)>, SolveError> {
        junction_candidates(self.network(), count)
    }
}
