//! Priority edge list and greedy network completion.
//!
//! # Algorithm
//!
//! For every pair of facilities `(a, b)`, the resources one supplies and
//! the other demands form a candidate edge. Its transfer vector holds, per
//! such resource, `min(|a|, |b|)` signed from `a`'s side, and its priority
//! is
//!
//! ```text
//! p(a, b) = quantity_weight × Σ|transfer| − distance_weight × d(a, b)
//! ```
//!
//! Completion walks the edges in decreasing priority and, for each, adds a
//! two-stop route carrying whatever both endpoints can still supply and
//! absorb, until the network satisfies its [`Constraints`].
//!
//! # Complexity
//!
//! Generation is O(f² log f) for f facilities (dominated by sorting);
//! completion is O(f²) route additions at most.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::distance::distance;
use crate::error::SolveError;
use crate::evaluation::Constraints;
use crate::models::{Location, Network, Resource, ResourceVector};

/// A candidate transfer between two facilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// First facility (lower location).
    pub start: Location,
    /// Second facility.
    pub end: Location,
    /// Shareable quantities, signed from `start`'s side.
    pub transfer: ResourceVector,
    /// Higher is tried first.
    pub priority: f64,
}

/// Candidate edges sorted by decreasing priority.
///
/// # Examples
///
/// ```
/// use u_logistics::constructive::EdgeList;
/// use u_logistics::evaluation::Constraints;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let one = ResourceVector::new().with(Resource::Copper, 1);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), one).unwrap();
/// net.add_factory(Location::new(0, 1), -one).unwrap();
///
/// let edges = EdgeList::generate(&net, 1.0, 3.0);
/// assert_eq!(edges.len(), 1);
///
/// let finished = edges.finish(&net, &Constraints).unwrap();
/// assert_eq!(finished.route_count(), 1);
/// assert!(Constraints.check(&finished));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeList {
    edges: Vec<Edge>,
}

impl EdgeList {
    /// Builds the edge list for every facility pair of `net`.
    ///
    /// Junctions never take part. Pairs with nothing to exchange are
    /// skipped. Among equal priorities, later pairs (in location order)
    /// come first.
    pub fn generate(net: &Network, distance_weight: f64, quantity_weight: f64) -> Self {
        let facilities: Vec<_> = net.facilities().filter(|f| !f.is_junction()).collect();
        let mut edges = Vec::new();
        for (i, a) in facilities.iter().enumerate() {
            for b in &facilities[i + 1..] {
                let (qa, qb) = (a.base(), b.base());
                let mut transfer = ResourceVector::new();
                let mut quantity = 0i64;
                for r in Resource::ALL {
                    if qa[r] == 0 || qb[r] == 0 || qa[r].signum() == qb[r].signum() {
                        continue;
                    }
                    let mag = qa[r].abs().min(qb[r].abs());
                    transfer[r] = mag * qa[r].signum();
                    quantity += i64::from(mag);
                }
                if quantity == 0 {
                    continue;
                }
                let d = distance(a.location(), b.location()).to_f64();
                edges.push(Edge {
                    start: a.location(),
                    end: b.location(),
                    transfer,
                    priority: quantity_weight * quantity as f64 - distance_weight * d,
                });
            }
        }
        // stable sort of the reversed pairs puts newer ties first
        edges.reverse();
        edges.sort_by(|x, y| y.priority.total_cmp(&x.priority));
        trace!(event = "edge_list_generated", edges = edges.len());
        Self { edges }
    }

    /// The edges, highest priority first.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of candidate edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no facility pair can exchange anything.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Completes `net` by walking the edges in priority order.
    ///
    /// A network that already satisfies `constraints` is returned as is.
    ///
    /// # Errors
    ///
    /// [`SolveError::EdgesExhausted`] if every edge was used and the
    /// network still fails `constraints`.
    pub fn finish(&self, net: &Network, constraints: &Constraints) -> Result<Network, SolveError> {
        finish_along(net, self.edges.iter(), constraints)
    }

    /// Like [`finish`](Self::finish) but walks the edges in random order.
    pub fn finish_randomly<R: Rng + ?Sized>(
        &self,
        net: &Network,
        constraints: &Constraints,
        rng: &mut R,
    ) -> Result<Network, SolveError> {
        let mut order: Vec<&Edge> = self.edges.iter().collect();
        order.shuffle(rng);
        finish_along(net, order.into_iter(), constraints)
    }
}

/// What `edge` can still carry given both endpoints' unallocated capacity.
fn viable_transfer(net: &Network, edge: &Edge) -> ResourceVector {
    let (Some(start), Some(end)) = (net.facility(edge.start), net.facility(edge.end)) else {
        return ResourceVector::new();
    };
    let (start_free, end_free) = (start.unallocated(), end.unallocated());
    let mut viable = ResourceVector::new();
    for (r, t) in edge.transfer.iter() {
        if t == 0 {
            continue;
        }
        let mag = t.abs().min(start_free[r].abs()).min(end_free[r].abs());
        viable[r] = if t > 0 { mag } else { -mag };
    }
    viable
}

fn finish_along<'a, I>(net: &Network, edges: I, constraints: &Constraints) -> Result<Network, SolveError>
where
    I: Iterator<Item = &'a Edge>,
{
    let mut finished = net.clone();
    let mut added = 0usize;
    for edge in edges {
        if constraints.check(&finished) {
            break;
        }
        let viable = viable_transfer(&finished, edge);
        if viable.is_empty() {
            continue;
        }
        finished.add_route_pair(edge.start, edge.end, viable, -viable)?;
        added += 1;
        trace!(
            event = "route_added",
            start = %edge.start,
            end = %edge.end,
            transfer = %viable,
        );
    }
    if !constraints.check(&finished) {
        return Err(SolveError::EdgesExhausted {
            routes: finished.route_count(),
            unsatisfied: finished.deficit(None).len(),
        });
    }
    debug!(event = "network_finished", routes_added = added, routes = finished.route_count());
    Ok(finished)
}
