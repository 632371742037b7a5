//! Domain model types for logistics networks.
//!
//! Provides the core abstractions: grid locations, the resource catalog
//! and signed resource vectors, facilities with an allocation ledger,
//! cyclic routes made of stops, and the network that keeps routes and
//! facility ledgers consistent.

mod facility;
mod location;
mod network;
mod resource;
mod route;

pub use facility::Facility;
pub use location::{Coord, Location};
pub use network::{Network, RouteKey};
pub use resource::{Quant, Resource, ResourceVector};
pub use route::{Route, Stop};
