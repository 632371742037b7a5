//! Genetic solver.
//!
//! Runs [`GaRunner`] over [`NetworkGaProblem`]: every individual is a
//! finished network, so the best one is already a solution.

use tracing::{info, warn};
use u_metaheur::ga::{GaConfig, GaRunner};

use super::Solver;
use crate::config::SolverConfig;
use crate::error::SolveError;
use crate::evaluation::{Constraints, CostFunction};
use crate::ga::NetworkGaProblem;
use crate::models::Network;

/// Population search over finished networks.
///
/// # Examples
///
/// ```
/// use u_logistics::config::{GeneticConfig, SolverConfig};
/// use u_logistics::evaluation::{CostFunction, CostWeights};
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
/// use u_logistics::solver::{GeneticSolver, Solver};
///
/// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), cu(1)).unwrap();
/// net.add_factory(Location::new(0, 1), cu(-1)).unwrap();
///
/// let config = SolverConfig::default().with_genetic(GeneticConfig {
///     population_size: 8,
///     max_generations: 4,
/// });
/// let mut solver = GeneticSolver::new(net, CostFunction::new(CostWeights::simple()), config);
/// let solved = solver.solve().unwrap();
/// assert!(solver.passes_constraints(&solved));
/// ```
#[derive(Debug, Clone)]
pub struct GeneticSolver {
    network: Network,
    cost_fn: CostFunction,
    constraints: Constraints,
    config: SolverConfig,
}

impl GeneticSolver {
    /// Creates a genetic solver for `network`.
    pub fn new(network: Network, cost_fn: CostFunction, config: SolverConfig) -> Self {
        Self {
            network,
            cost_fn,
            constraints: Constraints,
            config,
        }
    }

    /// Creates a genetic solver whose cost function uses the configured
    /// weights.
    pub fn from_config(network: Network, config: SolverConfig) -> Self {
        let cost_fn = CostFunction::new(config.cost);
        Self::new(network, cost_fn, config)
    }

    /// The configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

impl Solver for GeneticSolver {
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
        let problem = NetworkGaProblem::new(self.network.clone(), self.cost_fn.clone(), &self.config);
        let ga = GaConfig::default()
            .with_population_size(self.config.genetic.population_size)
            .with_max_generations(self.config.genetic.max_generations);
        info!(
            event = "solve_start",
            solver = "genetic",
            facilities = self.network.facility_count(),
            population = self.config.genetic.population_size,
            generations = self.config.genetic.max_generations,
        );
        let result = GaRunner::run(&problem, &ga);
        if !result.best_fitness.is_finite() {
            warn!(event = "no_feasible_individual", solver = "genetic");
            return problem.finish();
        }
        info!(
            event = "solve_end",
            solver = "genetic",
            cost = result.best_fitness,
            routes = result.best.network().route_count(),
        );
        Ok(result.best.into_network())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneticConfig;
    use crate::evaluation::CostWeights;
    use crate::fixtures::{self, copper};
    use crate::models::Location;

    fn small() -> SolverConfig {
        SolverConfig::default().with_genetic(GeneticConfig {
            population_size: 10,
            max_generations: 8,
        })
    }

    #[test]
    fn test_solves_fixtures() {
        for (name, net) in fixtures::all() {
            let mut s = GeneticSolver::new(net, CostFunction::new(CostWeights::simple()), small());
            let solved = s.solve().unwrap();
            assert!(s.passes_constraints(&solved), "{name} unsolved");
            assert!(s.cost(&solved).is_finite());
        }
    }

    #[test]
    fn test_infeasible_network() {
        let mut net = fixtures::basic();
        net.add_factory(Location::new(3, 3), copper(-1)).unwrap();
        let mut s = GeneticSolver::new(net, CostFunction::new(CostWeights::simple()), small());
        assert_eq!(s.solve(), Err(SolveError::InfeasibleNetwork));
    }

    #[test]
    fn test_shares_junction_function() {
        let s = GeneticSolver::new(fixtures::dual_serve(), CostFunction::default(), small());
        assert_eq!(s.junction_function(2).unwrap().len(), 2);
    }

    #[test]
    fn test_from_config_uses_cost_table() {
        let solved_cost = |weight: f64| {
            let toml = format!(
                "[cost]\nnum_routes = {weight:?}\n\n[genetic]\npopulation_size = 8\nmax_generations = 4\n"
            );
            let config = SolverConfig::from_toml_str(&toml).unwrap();
            let mut s = GeneticSolver::from_config(fixtures::basic(), config);
            let solved = s.solve().unwrap();
            assert_eq!(solved.route_count(), 1);
            s.cost(&solved)
        };
        assert!((solved_cost(2.0) - 2.0).abs() < 1e-10);
        assert!((solved_cost(7.0) - 7.0).abs() < 1e-10);
    }
}
