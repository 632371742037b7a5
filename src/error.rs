//! Error types for network construction and solving.
//!
//! Rejected mutations ([`AllocationError`], [`NetworkError`]) are recoverable:
//! the value that produced them is left exactly as it was before the call.
//! [`RouteError`] reports misuse of the route API, and [`SolveError`] reports
//! structural impossibility inside a solver.

use thiserror::Error;

use crate::models::{Location, Quant, Resource};

/// A rejected [`Facility::allocate`](crate::models::Facility::allocate) or
/// [`Facility::deallocate`](crate::models::Facility::deallocate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The requested quantity points against the facility's base direction.
    #[error("{resource:?}: requested {requested} against base quantity {base}")]
    WrongDirection {
        resource: Resource,
        requested: Quant,
        base: Quant,
    },
    /// Not enough capacity left to satisfy the request.
    #[error("{resource:?}: requested {requested} but only {available} available")]
    Insufficient {
        resource: Resource,
        requested: Quant,
        available: Quant,
    },
}

/// Misuse of the [`Route`](crate::models::Route) API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("a route needs at least 2 stops, got {len}")]
    TooFewStops { len: usize },
    #[error("stop index {index} out of range for route of {len} stops")]
    StopOutOfRange { index: usize, len: usize },
}

/// A rejected [`Network`](crate::models::Network) mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("no facility at {0}")]
    UnknownFacility(Location),
    #[error("no route with key {0}")]
    UnknownRoute(usize),
    /// A factory operation targeted a junction, or the other way around.
    #[error("facility at {location} is not a {expected}")]
    WrongKind {
        location: Location,
        expected: &'static str,
    },
    /// The location already holds a facility that routes still reference.
    #[error("location {0} is occupied by a facility in use")]
    Occupied(Location),
    #[error("allocation at {at} rejected: {source}")]
    Allocation {
        at: Location,
        #[source]
        source: AllocationError,
    },
    #[error(transparent)]
    Route(#[from] RouteError),
    /// Removing the stop would leave a route with fewer than 2 stops.
    #[error("stop {location} cannot be removed from route {route}")]
    StopNotRemovable { route: usize, location: Location },
}

/// A structural failure inside a solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The network's aggregate supply does not cover its aggregate demand.
    #[error("network is infeasible: aggregate demand exceeds supply")]
    InfeasibleNetwork,
    /// Every candidate edge was tried and demand remains unrouted.
    #[error("edge list exhausted after {routes} routes with {unsatisfied} facilities unsatisfied")]
    EdgesExhausted { routes: usize, unsatisfied: usize },
    #[error("cannot classify the octant between {a} and {b}")]
    UnclassifiableOctant { a: Location, b: Location },
    #[error(transparent)]
    Network(#[from] NetworkError),
}
