//! Genetic algorithm components for network completion.
//!
//! - [`NetworkIndividual`] — a finished network with its fitness
//! - [`NetworkGaProblem`] — [`GaProblem`](u_metaheur::ga::GaProblem) implementation

mod chromosome;
mod problem;

pub use chromosome::NetworkIndividual;
pub use problem::NetworkGaProblem;
