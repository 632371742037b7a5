//! Solver configuration.
//!
//! Every field has a default, so a config file only names what it changes.
//!
//! # Examples
//!
//! ```
//! use u_logistics::config::SolverConfig;
//! use u_logistics::evaluation::Metric;
//!
//! let config = SolverConfig::from_toml_str(r#"
//!     track = 8
//!     random_seed = 42
//!
//!     [cost]
//!     num_routes = 3.0
//!
//!     [genetic]
//!     population_size = 40
//! "#).unwrap();
//!
//! assert_eq!(config.track, 8);
//! assert_eq!(config.seed(), 42);
//! assert_eq!(config.cost.weight(Metric::NumRoutes), 3.0);
//! assert_eq!(config.cost.weight(Metric::MaxLength), 0.0);
//! assert_eq!(config.genetic.max_generations, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::CostWeights;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Parameters shared by the solvers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverConfig {
    /// Edge priority penalty per unit of distance.
    pub distance_weight: f64,

    /// Edge priority reward per unit of shareable quantity.
    pub quantity_weight: f64,

    /// Beam width of the polish phase.
    pub track: usize,

    /// Multi-splice stop weight; higher values stop sooner.
    pub splice_stop: usize,

    /// Random seed; `None` means seed 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u64>,

    /// Cost metric weights used by `GreedyEdgeList::from_config` and
    /// `GeneticSolver::from_config`. A `[cost]` table replaces the defaults
    /// whole; metrics it leaves out weigh zero.
    pub cost: CostWeights,

    /// Genetic solver parameters.
    pub genetic: GeneticConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            distance_weight: 1.0,
            quantity_weight: 3.0,
            track: 5,
            splice_stop: 4,
            random_seed: None,
            cost: CostWeights::all_metrics(),
            genetic: GeneticConfig::default(),
        }
    }
}

impl SolverConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, isn't valid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the polish beam width.
    pub fn with_track(mut self, track: usize) -> Self {
        self.track = track;
        self
    }

    /// Sets the multi-splice stop weight.
    pub fn with_splice_stop(mut self, splice_stop: usize) -> Self {
        self.splice_stop = splice_stop;
        self
    }

    /// Sets the edge priority weights.
    pub fn with_edge_weights(mut self, distance_weight: f64, quantity_weight: f64) -> Self {
        self.distance_weight = distance_weight;
        self.quantity_weight = quantity_weight;
        self
    }

    /// Sets the cost metric weights.
    pub fn with_cost(mut self, cost: CostWeights) -> Self {
        self.cost = cost;
        self
    }

    /// Sets the genetic solver parameters.
    pub fn with_genetic(mut self, genetic: GeneticConfig) -> Self {
        self.genetic = genetic;
        self
    }

    /// The seed solvers draw from.
    pub fn seed(&self) -> u64 {
        self.random_seed.unwrap_or(0)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.track == 0 {
            return Err(ConfigError::Invalid("track must be at least 1".into()));
        }
        if !self.distance_weight.is_finite() || !self.quantity_weight.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "edge weights must be finite, got distance {} and quantity {}",
                self.distance_weight, self.quantity_weight
            )));
        }
        if !self.cost.is_finite() {
            return Err(ConfigError::Invalid("cost weights must be finite".into()));
        }
        if self.genetic.population_size == 0 {
            return Err(ConfigError::Invalid(
                "genetic.population_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Genetic solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub max_generations: usize,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
        }
    }
}
