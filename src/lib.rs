//! # u-logistics
//!
//! Logistics network optimization: facilities with signed resource supply
//! and demand on an octile grid, cyclic transport routes that claim those
//! resources, and heuristic solvers that complete and simplify the routes.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Location, ResourceVector, Facility, Route, Network)
//! - [`distance`] — Exact octile grid distance
//! - [`evaluation`] — Feasibility constraints and the weighted cost function
//! - [`constructive`] — Edge-list network completion and junction candidates
//! - [`local_search`] — Route splicing and best-K polish
//! - [`ga`] — Genetic algorithm over whole networks
//! - [`solver`] — Solver trait with greedy edge-list and genetic solvers
//! - [`generator`] — Seeded random networks
//! - [`config`] — TOML solver configuration
//! - [`error`] — Error types

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod generator;
pub mod local_search;
pub mod models;
pub mod solver;

#[cfg(test)]
mod fixtures;
