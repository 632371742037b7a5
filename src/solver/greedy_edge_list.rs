//! Greedy edge-list solver.
//!
//! # Algorithm
//!
//! 1. Rank every facility pair that can exchange resources by
//!    `quantity_weight × quantity − distance_weight × distance`.
//! 2. Finish the network by adding two-stop routes along the ranked pairs
//!    until every demand is routed.
//! 3. Polish the finished network with a best-K beam of random
//!    multi-splices (see [`fully_polish`]).
//!
//! # Complexity
//!
//! O(f² log f) to rank and O(f²) to finish for f facilities; polish is
//! bounded by the finished route count.

use rand::Rng;
use tracing::info;
use u_numflow::random::create_rng;

use super::Solver;
use crate::config::SolverConfig;
use crate::constructive::EdgeList;
use crate::error::SolveError;
use crate::evaluation::{Constraints, CostFunction};
use crate::local_search::fully_polish;
use crate::models::Network;

/// Greedy completion plus splice polish.
///
/// # Examples
///
/// ```
/// use u_logistics::config::SolverConfig;
/// use u_logistics::evaluation::{CostFunction, CostWeights};
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
/// use u_logistics::solver::{GreedyEdgeList, Solver};
///
/// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), cu(3)).unwrap();
/// net.add_factory(Location::new(2, 1), cu(-1)).unwrap();
/// net.add_factory(Location::new(1, 2), cu(-2)).unwrap();
///
/// let mut solver = GreedyEdgeList::new(
///     net,
///     CostFunction::new(CostWeights::simple()),
///     SolverConfig::default().with_seed(1),
/// );
/// let solved = solver.solve().unwrap();
/// assert!(solver.passes_constraints(&solved));
/// assert_eq!(solved.route_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GreedyEdgeList {
    network: Network,
    cost_fn: CostFunction,
    constraints: Constraints,
    config: SolverConfig,
    edges: EdgeList,
    history: Vec<(Network, f64)>,
}

impl GreedyEdgeList {
    /// Creates a solver for `network`, ranking its edges with the
    /// configured weights.
    pub fn new(network: Network, cost_fn: CostFunction, config: SolverConfig) -> Self {
        let edges = EdgeList::generate(&network, config.distance_weight, config.quantity_weight);
        Self {
            network,
            cost_fn,
            constraints: Constraints,
            config,
            edges,
            history: Vec::new(),
        }
    }

    /// Creates a solver whose cost function uses the configured weights.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_logistics::config::SolverConfig;
    /// use u_logistics::models::{Location, Network, Resource, ResourceVector};
    /// use u_logistics::solver::{GreedyEdgeList, Solver};
    ///
    /// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
    /// let mut net = Network::new();
    /// net.add_factory(Location::new(0, 0), cu(1)).unwrap();
    /// net.add_factory(Location::new(0, 1), cu(-1)).unwrap();
    ///
    /// let config = SolverConfig::from_toml_str("[cost]\nnum_routes = 3.0").unwrap();
    /// let mut solver = GreedyEdgeList::from_config(net, config);
    /// let solved = solver.solve().unwrap();
    /// assert!((solver.cost(&solved) - 3.0).abs() < 1e-10);
    /// ```
    pub fn from_config(network: Network, config: SolverConfig) -> Self {
        let cost_fn = CostFunction::new(config.cost);
        Self::new(network, cost_fn, config)
    }

    /// The ranked edges.
    pub fn edges(&self) -> &EdgeList {
        &self.edges
    }

    /// The configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Best network and cost after each polish round of the last solve.
    pub fn history(&self) -> &[(Network, f64)] {
        &self.history
    }

    /// Completes the network along the ranked edges.
    pub fn finish_network(&self) -> Result<Network, SolveError> {
        self.edges.finish(&self.network, &self.constraints)
    }

    /// Completes the network along the edges in random order.
    pub fn finish_network_randomly<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network, SolveError> {
        self.edges.finish_randomly(&self.network, &self.constraints, rng)
    }
}

impl Solver for GreedyEdgeList {
    fn network(&self) -> &Network {
        &self.network
    }

    fn cost_function(&self) -> &CostFunction {
        &self.cost_fn
    }

    fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    fn solve(&mut self) -> Result<Network, SolveError> {
        if !self.can_solve() {
            return Err(SolveError::InfeasibleNetwork);
        }
        info!(
            event = "solve_start",
            solver = "greedy_edge_list",
            facilities = self.network.facility_count(),
            edges = self.edges.len(),
        );
        let finished = self.finish_network()?;
        let mut rng = create_rng(self.config.seed());
        let polished = fully_polish(
            finished,
            &self.cost_fn,
            &self.constraints,
            self.config.track,
            self.config.splice_stop,
            &mut rng,
        )?;
        info!(
            event = "solve_end",
            solver = "greedy_edge_list",
            cost = polished.cost,
            routes = polished.network.route_count(),
            rounds = polished.history.len(),
        );
        self.history = polished.history;
        Ok(polished.network)
    }
}
