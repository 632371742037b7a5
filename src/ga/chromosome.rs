//! Network chromosome for the genetic solver.
//!
//! Each individual is a whole network, routes and ledger included. There
//! is no separate encoding to decode: the network is evaluated directly.

use u_metaheur::ga::Individual;

use crate::models::Network;

/// A network together with its fitness. Lower is better.
///
/// # Examples
///
/// ```
/// use u_logistics::ga::NetworkIndividual;
/// use u_logistics::models::Network;
/// use u_metaheur::ga::Individual;
///
/// let ind = NetworkIndividual::new(Network::new());
/// assert_eq!(ind.network().route_count(), 0);
/// assert_eq!(ind.fitness(), f64::INFINITY);
/// ```
#[derive(Debug, Clone)]
pub struct NetworkIndividual {
    network: Network,
    fitness: f64,
}

impl NetworkIndividual {
    /// Wraps a network with unknown (infinite) fitness.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            fitness: f64::INFINITY,
        }
    }

    /// The network.
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Mutable access to the network.
    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    /// Unwraps the network.
    pub fn into_network(self) -> Network {
        self.network
    }
}

impl Individual for NetworkIndividual {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}
