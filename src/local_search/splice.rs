//! Route splicing operator.
//!
//! # Algorithm
//!
//! Two routes that call at a common place (the link) are merged into one:
//!
//! 1. Rotate both routes so the link comes first.
//! 2. Walk both backwards from their last stops while they agree, and
//!    rotate again so the shared run that leads into the link comes first.
//! 3. Walk forwards while the routes agree to measure the shared run.
//! 4. Fold the second route's commands into the shared run of the first,
//!    then insert the second route's remaining stops right after it.
//! 5. Merge any consecutive duplicate stops this produced.
//!
//! Splicing only moves commands between routes; every facility's total
//! allocation is unchanged.
//!
//! # Complexity
//!
//! O(s + f) per splice for s stops and f places (the network is
//! snapshotted so a failed splice can be undone).

use std::collections::BTreeMap;

use rand::Rng;
use tracing::trace;

use crate::error::NetworkError;
use crate::models::{Location, Network, RouteKey};

/// Index from each place to the routes calling there.
///
/// Kept up to date across splices so random splice targets can be drawn
/// without rescanning every route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStops {
    routes_at: BTreeMap<Location, Vec<RouteKey>>,
}

impl SharedStops {
    /// Indexes every route of `net`.
    pub fn build(net: &Network) -> Self {
        let mut routes_at: BTreeMap<Location, Vec<RouteKey>> = BTreeMap::new();
        for (key, route) in net.routes().iter().enumerate() {
            for stop in route.stops() {
                let keys = routes_at.entry(stop.location).or_default();
                if keys.last() != Some(&key) {
                    keys.push(key);
                }
            }
        }
        Self { routes_at }
    }

    /// Routes calling at `location`, ascending.
    pub fn routes_at(&self, location: Location) -> &[RouteKey] {
        self.routes_at
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Places called at by two or more routes.
    pub fn shared_locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.routes_at
            .iter()
            .filter(|(_, keys)| keys.len() >= 2)
            .map(|(loc, _)| *loc)
    }

    /// Records that route `removed` was spliced into route `kept`.
    ///
    /// Keys above `removed` shift down by one, as they do in the network.
    pub fn merge(&mut self, kept: RouteKey, removed: RouteKey) {
        for keys in self.routes_at.values_mut() {
            let had_removed = keys.contains(&removed);
            keys.retain(|&k| k != removed);
            if had_removed && !keys.contains(&kept) {
                keys.push(kept);
            }
            for k in keys.iter_mut() {
                if *k > removed {
                    *k -= 1;
                }
            }
            keys.sort_unstable();
        }
    }
}

/// Splices route `r2` into route `r1` at the shared place `link`.
///
/// The lower key survives; the higher one is removed. Returns `Ok(false)`
/// without change when the keys are equal or either route misses `link`.
/// On `Err` the network is restored to its state before the call.
///
/// # Examples
///
/// ```
/// use u_logistics::local_search::splice_routes;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
/// let (hub, a, b) = (Location::new(0, 0), Location::new(2, 1), Location::new(1, 2));
/// let mut net = Network::new();
/// net.add_factory(hub, cu(2)).unwrap();
/// net.add_factory(a, cu(-1)).unwrap();
/// net.add_factory(b, cu(-1)).unwrap();
/// net.add_route_pair(hub, a, cu(1), cu(-1)).unwrap();
/// net.add_route_pair(hub, b, cu(1), cu(-1)).unwrap();
///
/// assert!(splice_routes(&mut net, 0, 1, hub).unwrap());
/// assert_eq!(net.route_count(), 1);
/// assert_eq!(net.route_stops(0).unwrap(), vec![hub, b, a]);
/// assert_eq!(net.stop_command(0, 0).unwrap(), cu(2));
/// ```
pub fn splice_routes(
    net: &mut Network,
    r1: RouteKey,
    r2: RouteKey,
    link: Location,
) -> Result<bool, NetworkError> {
    if r1 == r2 {
        return Ok(false);
    }
    let (r1, r2) = (r1.min(r2), r1.max(r2));
    let first = net.route(r1).ok_or(NetworkError::UnknownRoute(r1))?;
    let second = net.route(r2).ok_or(NetworkError::UnknownRoute(r2))?;
    let (Some(i1), Some(i2)) = (first.find_stop(link), second.find_stop(link)) else {
        return Ok(false);
    };

    let snapshot = net.clone();
    match splice_aligned(net, r1, r2, i1, i2) {
        Ok(()) => Ok(true),
        Err(err) => {
            *net = snapshot;
            Err(err)
        }
    }
}

fn splice_aligned(
    net: &mut Network,
    r1: RouteKey,
    r2: RouteKey,
    i1: usize,
    i2: usize,
) -> Result<(), NetworkError> {
    net.rotate_route(r1, i1)?;
    net.rotate_route(r2, i2)?;

    let (a, b) = (net.route_stops(r1)?, net.route_stops(r2)?);
    let back = shared_run_before_link(&a, &b);
    if back != 0 {
        net.rotate_route(r1, a.len() - back)?;
        net.rotate_route(r2, b.len() - back)?;
    }

    let (a, b) = (net.route_stops(r1)?, net.route_stops(r2)?);
    let mut matched = 1;
    while matched < a.len().min(b.len()) && a[matched] == b[matched] {
        matched += 1;
    }

    let second = net.erase_route(r2)?;
    for (i, stop) in second.stops().iter().enumerate() {
        if i < matched {
            let merged = net.stop_command(r1, i)? + stop.command;
            net.set_stop_command(r1, i, merged)?;
        } else {
            net.add_stop(r1, stop.location, i, stop.command)?;
        }
    }
    let merged = net.merge_repeated_stops(r1)?;
    trace!(event = "splice", kept = r1, removed = r2, matched, merged);
    Ok(())
}

/// Number of trailing stops the two routes share, walking back from their
/// last stops.
fn shared_run_before_link(a: &[Location], b: &[Location]) -> usize {
    let (mut i, mut j) = (a.len() - 1, b.len() - 1);
    while a[i] == b[j] {
        if i == 0 || j == 0 {
            break;
        }
        i -= 1;
        j -= 1;
    }
    a.len() - 1 - i
}

/// Splices two random routes at a random shared place.
///
/// Returns `Ok(false)` if no place is shared by two routes.
pub fn randomly_splice<R: Rng + ?Sized>(
    net: &mut Network,
    shared: &mut SharedStops,
    rng: &mut R,
) -> Result<bool, NetworkError> {
    let links: Vec<Location> = shared.shared_locations().collect();
    if links.is_empty() {
        return Ok(false);
    }
    let link = links[rng.random_range(0..links.len())];
    let keys = shared.routes_at(link);
    let a = rng.random_range(0..keys.len());
    let mut b = rng.random_range(0..keys.len() - 1);
    if b >= a {
        b += 1;
    }
    let (r1, r2) = (keys[a].min(keys[b]), keys[a].max(keys[b]));
    if !splice_routes(net, r1, r2, link)? {
        return Ok(false);
    }
    shared.merge(r1, r2);
    Ok(true)
}

/// Splices repeatedly: always once, then again with probability
/// `(n - p) / n`, where `n` is the shrinking route count and
/// `p = min(stop_weight, routes / 2)`.
///
/// Returns how many splices were made.
pub fn multi_splice<R: Rng + ?Sized>(
    net: &mut Network,
    shared: &mut SharedStops,
    stop_weight: usize,
    rng: &mut R,
) -> Result<usize, NetworkError> {
    let mut remaining = net.route_count();
    let p = stop_weight.min(remaining / 2);
    let mut spliced = 0;
    while randomly_splice(net, shared, rng)? {
        spliced += 1;
        remaining -= 1;
        if remaining == 0 || rng.random_range(0..remaining) < p {
            break;
        }
    }
    Ok(spliced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::EdgeList;
    use crate::evaluation::Constraints;
    use crate::fixtures::copper;
    use crate::models::{ResourceVector, Route};

    fn loc(x: i32, y: i32) -> Location {
        Location::new(x, y)
    }

    /// One hub supplying `n` consumers on a ring around it, one shuttle each.
    fn star(n: i32) -> Network {
        let mut net = Network::new();
        net.add_factory(loc(0, 0), copper(n)).unwrap();
        for i in 0..n {
            let at = loc(3 * (i + 1), 2 * (i % 3) - 2);
            net.add_factory(at, copper(-1)).unwrap();
            net.add_route_pair(loc(0, 0), at, copper(1), copper(-1))
                .unwrap();
        }
        net
    }

    fn junctions(points: &[(i32, i32)]) -> Network {
        let mut net = Network::new();
        for &(x, y) in points {
            net.create_junction(loc(x, y)).unwrap();
        }
        net
    }

    #[test]
    fn test_disjoint_tails_concatenate() {
        let (hub, a, b, c, d) = (loc(0, 0), loc(1, 0), loc(2, 0), loc(0, 1), loc(0, 2));
        let mut net = junctions(&[(0, 0), (1, 0), (2, 0), (0, 1), (0, 2)]);
        net.add_route_keys(&[hub, a, b], &[]).unwrap();
        net.add_route_keys(&[c, hub, d], &[]).unwrap();
        assert!(splice_routes(&mut net, 0, 1, hub).unwrap());
        assert_eq!(net.route_count(), 1);
        // 3 + 3 - 1 stops, second route's tail first
        assert_eq!(net.route_stops(0).unwrap(), vec![hub, d, c, a, b]);
    }

    #[test]
    fn test_allocation_preserved() {
        let mut net = star(2);
        let before: Vec<_> = net.facilities().cloned().collect();
        let total = net.route(0).unwrap().net_resources() + net.route(1).unwrap().net_resources();
        assert!(splice_routes(&mut net, 1, 0, loc(0, 0)).unwrap());
        let after: Vec<_> = net.facilities().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(net.route(0).unwrap().net_resources(), total);
        assert_eq!(net.route(0).unwrap().len(), 3);
        assert!(Constraints.check(&net));
    }

    #[test]
    fn test_shared_run_is_aligned() {
        let (l, x, p, y, z) = (loc(0, 0), loc(1, 0), loc(2, 0), loc(3, 0), loc(4, 0));
        let mut net = junctions(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        net.add_route_keys(&[l, x, y, z], &[]).unwrap();
        net.add_route_keys(&[l, p, y, z], &[]).unwrap();
        assert!(splice_routes(&mut net, 0, 1, l).unwrap());
        // y, z, l are walked once; p and x hang off the shared run
        assert_eq!(net.route_stops(0).unwrap(), vec![y, z, l, p, x]);
    }

    #[test]
    fn test_identical_routes_merge_commands() {
        let (l, a) = (loc(0, 0), loc(0, 1));
        let mut net = Network::new();
        net.add_factory(l, copper(2)).unwrap();
        net.add_factory(a, copper(-2)).unwrap();
        net.add_route_pair(l, a, copper(1), copper(-1)).unwrap();
        net.add_route_pair(a, l, copper(-1), copper(1)).unwrap();
        assert!(splice_routes(&mut net, 0, 1, l).unwrap());
        assert_eq!(net.route_count(), 1);
        let route = net.route(0).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.net_resources(), ResourceVector::new());
        assert_eq!(route.command(route.find_stop(l).unwrap()).unwrap(), copper(2));
        assert!(Constraints.check(&net));
    }

    #[test]
    fn test_splice_without_link_is_noop() {
        let mut net = star(2);
        let before = net.clone();
        assert!(!splice_routes(&mut net, 0, 1, loc(3, -2)).unwrap());
        assert!(!splice_routes(&mut net, 1, 1, loc(0, 0)).unwrap());
        assert_eq!(net, before);
        assert_eq!(
            splice_routes(&mut net, 0, 9, loc(0, 0)),
            Err(NetworkError::UnknownRoute(9))
        );
    }

    #[test]
    fn test_splice_merges_repeats() {
        let (l, a, b) = (loc(0, 0), loc(1, 0), loc(2, 0));
        let mut net = junctions(&[(0, 0), (1, 0), (2, 0)]);
        net.add_route_keys(&[l, a, b], &[]).unwrap();
        net.add_route_keys(&[l, b, a], &[]).unwrap();
        assert!(splice_routes(&mut net, 0, 1, l).unwrap());
        let route = net.route(0).unwrap();
        assert!(Constraints.route_check_twice(route));
        assert_eq!(
            route.clone(),
            Route::from_keys(&[l, b, a, b], &[]).unwrap()
        );
    }

    #[test]
    fn test_shared_stops_index() {
        let net = star(3);
        let shared = SharedStops::build(&net);
        assert_eq!(shared.routes_at(loc(0, 0)), &[0, 1, 2]);
        assert_eq!(shared.routes_at(loc(3, -2)), &[0]);
        assert_eq!(shared.shared_locations().collect::<Vec<_>>(), vec![loc(0, 0)]);
        assert!(shared.routes_at(loc(50, 50)).is_empty());
    }

    #[test]
    fn test_shared_stops_merge_matches_rebuild() {
        let mut net = star(4);
        let mut shared = SharedStops::build(&net);
        assert!(splice_routes(&mut net, 1, 3, loc(0, 0)).unwrap());
        shared.merge(1, 3);
        assert_eq!(shared, SharedStops::build(&net));
    }

    #[test]
    fn test_randomly_splice() {
        let mut net = star(3);
        let mut shared = SharedStops::build(&net);
        let mut rng = u_numflow::random::create_rng(42);
        assert!(randomly_splice(&mut net, &mut shared, &mut rng).unwrap());
        assert_eq!(net.route_count(), 2);
        assert_eq!(shared, SharedStops::build(&net));
        assert!(Constraints.check(&net));
    }

    #[test]
    fn test_randomly_splice_nothing_shared() {
        let mut net = star(1);
        let mut shared = SharedStops::build(&net);
        let mut rng = u_numflow::random::create_rng(42);
        assert!(!randomly_splice(&mut net, &mut shared, &mut rng).unwrap());
    }

    #[test]
    fn test_multi_splice() {
        let original = star(6);
        for seed in 0..20 {
            let mut net = original.clone();
            let mut shared = SharedStops::build(&net);
            let mut rng = u_numflow::random::create_rng(seed);
            let spliced = multi_splice(&mut net, &mut shared, 4, &mut rng).unwrap();
            assert!(spliced >= 1);
            assert_eq!(net.route_count(), 6 - spliced);
            assert!(Constraints.check(&net));
            let before: Vec<_> = original.facilities().cloned().collect();
            let after: Vec<_> = net.facilities().cloned().collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_multi_splice_after_finish() {
        let mut net = Network::new();
        net.add_factory(loc(0, 0), copper(3)).unwrap();
        net.add_factory(loc(2, 1), copper(-1)).unwrap();
        net.add_factory(loc(1, 2), copper(-2)).unwrap();
        let mut finished = EdgeList::generate(&net, 1.0, 3.0)
            .finish(&net, &Constraints)
            .unwrap();
        let mut shared = SharedStops::build(&finished);
        let mut rng = u_numflow::random::create_rng(1);
        assert_eq!(multi_splice(&mut finished, &mut shared, 4, &mut rng).unwrap(), 1);
        assert_eq!(finished.route_count(), 1);
        assert!(Constraints.check(&finished));
    }
}
