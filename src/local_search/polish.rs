//! Splice-based polish with a bounded best-K beam.
//!
//! # Algorithm
//!
//! Keep the `track` cheapest networks seen so far, seeded with copies of
//! the starting network. Each round visits the beam slots in order and
//! multi-splices a copy of whatever network holds the slot at that moment,
//! so a network that entered the beam earlier in the round may be spliced
//! again. A copy that is valid and cheaper than the worst tracked network
//! is placed ahead of any tracked network of equal cost and the worst one
//! is dropped.
//!
//! The round budget starts at the starting route count and is cut to
//! `best.route_count() + 2` after every round, so the search winds down
//! as routes merge away.
//!
//! # Complexity
//!
//! O(r · track · s) for r routes and s stops per splice.

use rand::Rng;
use tracing::debug;

use super::splice::{multi_splice, SharedStops};
use crate::error::NetworkError;
use crate::evaluation::{Constraints, CostFunction};
use crate::models::Network;

/// Result of [`fully_polish`].
#[derive(Debug, Clone, PartialEq)]
pub struct Polished {
    /// Cheapest network found.
    pub network: Network,
    /// Its cost.
    pub cost: f64,
    /// Best network and cost after each round.
    pub history: Vec<(Network, f64)>,
}

#[derive(Debug, Clone)]
struct Candidate {
    network: Network,
    shared: SharedStops,
    cost: f64,
}

/// Polishes a finished network by repeated random splicing.
///
/// `track` is the beam width (at least one network is always kept) and
/// `splice_stop` the multi-splice stop weight. The starting network is
/// returned unchanged if no splice ever improves it.
///
/// # Errors
///
/// Propagates a [`NetworkError`] from a failed splice, which means the
/// network's ledger was already inconsistent.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::{Constraints, CostFunction, CostWeights};
/// use u_logistics::local_search::fully_polish;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let cu = |q| ResourceVector::new().with(Resource::Copper, q);
/// let hub = Location::new(0, 0);
/// let mut net = Network::new();
/// net.add_factory(hub, cu(2)).unwrap();
/// for at in [Location::new(2, 1), Location::new(1, 2)] {
///     net.add_factory(at, cu(-1)).unwrap();
///     net.add_route_pair(hub, at, cu(1), cu(-1)).unwrap();
/// }
///
/// let cost = CostFunction::new(CostWeights::simple());
/// let mut rng = u_numflow::random::create_rng(3);
/// let polished = fully_polish(net, &cost, &Constraints, 5, 4, &mut rng).unwrap();
/// assert_eq!(polished.network.route_count(), 1);
/// assert!(Constraints.check(&polished.network));
/// ```
pub fn fully_polish<R: Rng + ?Sized>(
    network: Network,
    cost_fn: &CostFunction,
    constraints: &Constraints,
    track: usize,
    splice_stop: usize,
    rng: &mut R,
) -> Result<Polished, NetworkError> {
    let track = track.max(1);
    let start = Candidate {
        cost: cost_fn.evaluate(&network),
        shared: SharedStops::build(&network),
        network,
    };
    let mut iters = start.network.route_count();
    let mut best = vec![start; track];
    let mut history = Vec::new();

    let mut round = 0;
    while round < iters {
        for slot in 0..track {
            let mut child = best[slot].clone();
            if multi_splice(&mut child.network, &mut child.shared, splice_stop, rng)? == 0 {
                continue;
            }
            child.cost = cost_fn.evaluate(&child.network);
            let worst = best.last().map_or(f64::INFINITY, |c| c.cost);
            if child.cost < worst && constraints.check(&child.network) {
                insert_ranked(&mut best, child, track);
            }
        }
        iters = iters.min(best[0].network.route_count() + 2);
        history.push((best[0].network.clone(), best[0].cost));
        debug!(
            event = "polish_round",
            round,
            budget = iters,
            best_cost = best[0].cost,
            routes = best[0].network.route_count(),
        );
        round += 1;
    }

    let winner = best.swap_remove(0);
    Ok(Polished {
        network: winner.network,
        cost: winner.cost,
        history,
    })
}

/// Inserts `child` before every candidate of equal or higher cost, keeping
/// at most `track` candidates.
fn insert_ranked(best: &mut Vec<Candidate>, child: Candidate, track: usize) {
    let at = best.partition_point(|c| c.cost < child.cost);
    best.insert(at, child);
    best.truncate(track);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::EdgeList;
    use crate::evaluation::CostWeights;
    use crate::fixtures::{self, copper};
    use crate::models::Location;

    fn spokes(n: i32) -> Network {
        let hub = Location::new(0, 0);
        let mut net = Network::new();
        net.add_factory(hub, copper(n)).unwrap();
        for i in 0..n {
            let at = Location::new(i - n / 2, 4 + i % 2);
            net.add_factory(at, copper(-1)).unwrap();
            net.add_route_pair(hub, at, copper(1), copper(-1)).unwrap();
        }
        net
    }

    fn simple() -> CostFunction {
        CostFunction::new(CostWeights::simple())
    }

    fn candidate(network: Network, cost: f64) -> Candidate {
        Candidate {
            shared: SharedStops::build(&network),
            network,
            cost,
        }
    }

    #[test]
    fn test_insert_ranked_goes_before_equal_cost() {
        let mut best: Vec<_> = [1.0, 2.0, 2.0, 3.0]
            .into_iter()
            .map(|cost| candidate(Network::new(), cost))
            .collect();
        insert_ranked(&mut best, candidate(fixtures::basic(), 2.0), 4);
        let costs: Vec<f64> = best.iter().map(|c| c.cost).collect();
        assert_eq!(costs, vec![1.0, 2.0, 2.0, 2.0]);
        assert_eq!(best[1].network, fixtures::basic());
        assert_eq!(best[2].network, Network::new());
    }

    #[test]
    fn test_insert_ranked_drops_worst() {
        let mut best = vec![candidate(Network::new(), 1.0)];
        insert_ranked(&mut best, candidate(fixtures::basic(), 0.5), 1);
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].network, fixtures::basic());
    }

    #[test]
    fn test_polish_never_worse() {
        let net = spokes(6);
        let start = simple().evaluate(&net);
        let mut rng = u_numflow::random::create_rng(11);
        let polished = fully_polish(net, &simple(), &Constraints, 5, 4, &mut rng).unwrap();
        assert!(polished.cost <= start);
        assert!(polished.network.route_count() < 6);
        assert!(Constraints.check(&polished.network));
        assert!((polished.cost - simple().evaluate(&polished.network)).abs() < 1e-10);
    }

    #[test]
    fn test_history_is_monotone() {
        let mut rng = u_numflow::random::create_rng(5);
        let polished = fully_polish(spokes(6), &simple(), &Constraints, 3, 4, &mut rng).unwrap();
        assert!(!polished.history.is_empty());
        assert!(polished.history.len() <= 6);
        for pair in polished.history.windows(2) {
            assert!(pair[1].1 <= pair[0].1);
        }
        let (last, cost) = polished.history.last().unwrap();
        assert_eq!(*last, polished.network);
        assert!((cost - polished.cost).abs() < 1e-10);
    }

    #[test]
    fn test_polish_is_seeded() {
        let run = |seed| {
            let mut rng = u_numflow::random::create_rng(seed);
            fully_polish(spokes(6), &simple(), &Constraints, 4, 4, &mut rng).unwrap()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_polish_nothing_to_splice() {
        let mut net = fixtures::basic();
        net.add_route_pair(Location::new(0, 0), Location::new(0, 1), copper(1), copper(-1))
            .unwrap();
        let mut rng = u_numflow::random::create_rng(0);
        let polished = fully_polish(net.clone(), &simple(), &Constraints, 5, 4, &mut rng).unwrap();
        assert_eq!(polished.network, net);
        assert_eq!(polished.history.len(), 1);
    }

    #[test]
    fn test_polish_zero_track_keeps_one() {
        let mut rng = u_numflow::random::create_rng(2);
        let polished = fully_polish(spokes(3), &simple(), &Constraints, 0, 4, &mut rng).unwrap();
        assert!(Constraints.check(&polished.network));
    }

    #[test]
    fn test_polish_finished_fixtures() {
        for (name, net) in fixtures::all() {
            let finished = EdgeList::generate(&net, 1.0, 3.0)
                .finish(&net, &Constraints)
                .unwrap();
            let before = finished.route_count();
            let mut rng = u_numflow::random::create_rng(1);
            let polished = fully_polish(finished, &simple(), &Constraints, 5, 4, &mut rng).unwrap();
            assert!(Constraints.check(&polished.network), "{name} broken by polish");
            assert!(polished.network.route_count() <= before, "{name} gained routes");
        }
    }
}
