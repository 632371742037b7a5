//! Feasibility and validity checks.

use crate::models::{Location, Network, Quant, Resource, Route, RouteKey};

/// A broken constraint found in a network.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Aggregate demand for a resource exceeds aggregate supply.
    NetDeficit {
        /// Resource in deficit.
        resource: Resource,
        /// Network-wide base total (negative).
        total: Quant,
    },
    /// A route calls at the same place twice in a row.
    RepeatedStop {
        /// Offending route.
        route: RouteKey,
        /// Index of the first of the two stops; the pair may wrap around.
        index: usize,
        /// The repeated place.
        location: Location,
    },
    /// A facility's demand is not fully routed.
    Unsatisfied {
        /// Facility with unrouted demand.
        location: Location,
        /// Resource in deficit.
        resource: Resource,
        /// Remaining unallocated quantity (negative).
        unallocated: Quant,
    },
}

/// Predicate over a [`Network`].
///
/// The question-level check ([`is_valid_network`](Self::is_valid_network))
/// asks whether the network can be solved at all; the answer-level check
/// ([`is_valid_solution`](Self::is_valid_solution)) asks whether its routes
/// solve it. Both run in time linear in stops and facilities.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::Constraints;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let one = ResourceVector::new().with(Resource::Copper, 1);
/// let (mine, mill) = (Location::new(0, 0), Location::new(0, 1));
/// let mut net = Network::new();
/// net.add_factory(mine, one).unwrap();
/// net.add_factory(mill, -one).unwrap();
///
/// let constraints = Constraints;
/// assert!(constraints.is_valid_network(&net));
/// assert!(!constraints.is_valid_solution(&net));
///
/// net.add_route_pair(mine, mill, one, -one).unwrap();
/// assert!(constraints.check(&net));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints;

impl Constraints {
    /// Both levels: the network is solvable and its routes solve it.
    pub fn check(&self, net: &Network) -> bool {
        self.is_valid_network(net) && self.is_valid_solution(net)
    }

    /// Aggregate supply covers aggregate demand for every resource.
    pub fn is_valid_network(&self, net: &Network) -> bool {
        net.total_base().all_non_negative()
    }

    /// No route repeats a stop and every demand is routed.
    pub fn is_valid_solution(&self, net: &Network) -> bool {
        self.check_twice(net) && self.check_satisfied(net)
    }

    /// No route calls at the same place twice in a row, wraparound included.
    pub fn check_twice(&self, net: &Network) -> bool {
        net.routes().iter().all(|r| self.route_check_twice(r))
    }

    /// Single-route form of [`check_twice`](Self::check_twice).
    pub fn route_check_twice(&self, route: &Route) -> bool {
        route.edges().all(|(a, b)| a.location != b.location)
    }

    /// No facility has unrouted demand.
    pub fn check_satisfied(&self, net: &Network) -> bool {
        net.facilities().all(|f| f.unallocated().all_non_negative())
    }

    /// Every broken constraint, question level first.
    pub fn violations(&self, net: &Network) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (resource, total) in net.total_base().iter() {
            if total < 0 {
                violations.push(Violation::NetDeficit { resource, total });
            }
        }
        for (key, route) in net.routes().iter().enumerate() {
            for (index, (a, b)) in route.edges().enumerate() {
                if a.location == b.location {
                    violations.push(Violation::RepeatedStop {
                        route: key,
                        index,
                        location: a.location,
                    });
                }
            }
        }
        for facility in net.facilities() {
            for (resource, unallocated) in facility.unallocated().iter() {
                if unallocated < 0 {
                    violations.push(Violation::Unsatisfied {
                        location: facility.location(),
                        resource,
                        unallocated,
                    });
                }
            }
        }
        violations
    }
}
