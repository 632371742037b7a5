//! GA problem definition for network completion.
//!
//! Implements the [`GaProblem`](u_metaheur::ga::GaProblem) trait over whole
//! networks, reusing the edge-list finish and the splice moves.
//!
//! # Operators
//!
//! - **Creation**: finish along the edges in random order, then multi-splice
//! - **Crossover**: pour both parents' routes in random order into the bare
//!   network, keeping each one the ledger still admits, then finish and
//!   multi-splice
//! - **Mutation**: one of reverse (1), rotate (1), splice (5),
//!   multi-splice (1) or drop-and-refinish (3), by weight
//! - **Evaluation**: cost when the constraints pass, infinity otherwise

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;
use u_metaheur::ga::GaProblem;

use crate::config::SolverConfig;
use crate::constructive::EdgeList;
use crate::error::SolveError;
use crate::evaluation::{Constraints, CostFunction};
use crate::local_search::{multi_splice, randomly_splice, SharedStops};
use crate::models::{Network, Route};

use super::chromosome::NetworkIndividual;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Reverse,
    Rotate,
    Splice,
    MultiSplice,
    DropRoute,
}

impl Mutation {
    const WEIGHTED: [(Mutation, u32); 5] = [
        (Mutation::Reverse, 1),
        (Mutation::Rotate, 1),
        (Mutation::Splice, 5),
        (Mutation::MultiSplice, 1),
        (Mutation::DropRoute, 3),
    ];

    fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let total: u32 = Self::WEIGHTED.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0..total);
        for (mutation, weight) in Self::WEIGHTED {
            if roll < weight {
                return mutation;
            }
            roll -= weight;
        }
        Mutation::DropRoute
    }
}

/// GA problem whose individuals are finished networks.
///
/// # Examples
///
/// ```
/// use u_logistics::config::SolverConfig;
/// use u_logistics::evaluation::{CostFunction, CostWeights};
/// use u_logistics::ga::NetworkGaProblem;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
/// use u_metaheur::ga::{GaConfig, GaRunner};
///
/// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), cu(3)).unwrap();
/// net.add_factory(Location::new(2, 1), cu(-1)).unwrap();
/// net.add_factory(Location::new(1, 2), cu(-2)).unwrap();
///
/// let problem = NetworkGaProblem::new(
///     net,
///     CostFunction::new(CostWeights::simple()),
///     &SolverConfig::default(),
/// );
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(5);
///
/// let result = GaRunner::run(&problem, &config).unwrap();
/// assert!(result.best_fitness < f64::INFINITY);
/// ```
#[derive(Debug, Clone)]
pub struct NetworkGaProblem {
    network: Network,
    edges: EdgeList,
    cost_fn: CostFunction,
    constraints: Constraints,
    splice_stop: usize,
}

impl NetworkGaProblem {
    /// Creates a GA problem for `network`, ranking its edges with the
    /// configured weights.
    pub fn new(network: Network, cost_fn: CostFunction, config: &SolverConfig) -> Self {
        let edges = EdgeList::generate(&network, config.distance_weight, config.quantity_weight);
        Self {
            network,
            edges,
            cost_fn,
            constraints: Constraints,
            splice_stop: config.splice_stop,
        }
    }

    /// The network individuals are grown from.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Completes the network along the edges in priority order.
    pub fn finish(&self) -> Result<Network, SolveError> {
        self.edges.finish(&self.network, &self.constraints)
    }

    fn splice_some<R: Rng + ?Sized>(&self, net: &mut Network, rng: &mut R) {
        let mut shared = SharedStops::build(net);
        if let Err(err) = multi_splice(net, &mut shared, self.splice_stop, rng) {
            trace!(event = "splice_rejected", error = %err);
        }
    }

    fn offspring<R: Rng + ?Sized>(
        &self,
        parents: [&Network; 2],
        rng: &mut R,
    ) -> Result<Network, SolveError> {
        let mut routes: Vec<&Route> = parents.iter().flat_map(|p| p.routes()).collect();
        routes.shuffle(rng);
        let mut child = self.network.clone();
        child.erase_all_routes();
        inherit_routes(&mut child, routes);
        let mut child = self.edges.finish(&child, &self.constraints)?;
        self.splice_some(&mut child, rng);
        Ok(child)
    }

    fn try_mutate<R: Rng + ?Sized>(
        &self,
        net: &mut Network,
        rng: &mut R,
    ) -> Result<Mutation, SolveError> {
        let mutation = Mutation::pick(rng);
        let key = rng.random_range(0..net.route_count());
        match mutation {
            Mutation::Reverse => net.reverse_route(key)?,
            Mutation::Rotate => {
                let len = net.route_stops(key)?.len();
                net.rotate_route(key, rng.random_range(0..len))?;
            }
            Mutation::Splice => {
                let mut shared = SharedStops::build(net);
                randomly_splice(net, &mut shared, rng)?;
            }
            Mutation::MultiSplice => {
                let mut shared = SharedStops::build(net);
                multi_splice(net, &mut shared, self.splice_stop, rng)?;
            }
            Mutation::DropRoute => {
                let mut trial = net.clone();
                trial.erase_route(key)?;
                *net = self.edges.finish_randomly(&trial, &self.constraints, rng)?;
            }
        }
        Ok(mutation)
    }
}

/// Adds each route to `child` in turn, skipping routes the ledger can no
/// longer cover. Returns the number skipped.
fn inherit_routes<'a, I>(child: &mut Network, routes: I) -> usize
where
    I: IntoIterator<Item = &'a Route>,
{
    let mut skipped = 0;
    for route in routes {
        if let Err(err) = child.add_route(route.clone()) {
            skipped += 1;
            trace!(event = "route_skipped", stops = route.len(), error = %err);
        }
    }
    skipped
}

impl GaProblem for NetworkGaProblem {
    type Individual = NetworkIndividual;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> NetworkIndividual {
        match self.edges.finish_randomly(&self.network, &self.constraints, rng) {
            Ok(mut net) => {
                self.splice_some(&mut net, rng);
                NetworkIndividual::new(net)
            }
            Err(err) => {
                trace!(event = "finish_failed", error = %err);
                NetworkIndividual::new(self.network.clone())
            }
        }
    }

    fn evaluate(&self, individual: &NetworkIndividual) -> f64 {
        let net = individual.network();
        if self.constraints.check(net) {
            self.cost_fn.evaluate(net)
        } else {
            f64::INFINITY
        }
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &NetworkIndividual,
        parent2: &NetworkIndividual,
        rng: &mut R,
    ) -> Vec<NetworkIndividual> {
        let (p1, p2) = (parent1.network(), parent2.network());
        [[p1, p2], [p2, p1]]
            .into_iter()
            .zip([parent1, parent2])
            .map(|(parents, fallback)| match self.offspring(parents, rng) {
                Ok(net) => NetworkIndividual::new(net),
                Err(err) => {
                    trace!(event = "crossover_failed", error = %err);
                    NetworkIndividual::new(fallback.network().clone())
                }
            })
            .collect()
    }

    fn mutate<R: Rng>(&self, individual: &mut NetworkIndividual, rng: &mut R) {
        let net = individual.network_mut();
        if net.route_count() == 0 {
            return;
        }
        match self.try_mutate(net, rng) {
            Ok(mutation) => trace!(event = "mutated", ?mutation, routes = net.route_count()),
            Err(err) => trace!(event = "mutation_rejected", error = %err),
        }
    }
}
