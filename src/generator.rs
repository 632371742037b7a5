//! Seeded random networks for tests and benchmarks.
//!
//! Facilities are scattered over the square `[-max, max)²` with every
//! resource quantity drawn from `[-10, 10]`. If the draw leaves any
//! resource short, one more facility supplying exactly the shortfall is
//! added, so every generated network passes
//! [`Constraints::is_valid_network`](crate::evaluation::Constraints::is_valid_network).

use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;
use u_numflow::random::create_rng;

use crate::models::{Coord, Facility, Location, Network, Resource, ResourceVector};

const MAX_QUANTITY: i32 = 10;

/// Generates a random, globally feasible network without routes.
///
/// Returns an empty network if `facility_count < 2`, `max_coord < 1`, or
/// the square can't hold `facility_count` places. Draws that land on an
/// occupied cell are skipped, and at most `2 × facility_count` draws are
/// made, so crowded squares may yield fewer facilities.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::Constraints;
/// use u_logistics::generator::random_network;
///
/// let net = random_network(7, 12, 20);
/// assert!(net.facility_count() >= 2);
/// assert!(Constraints.is_valid_network(&net));
/// assert_eq!(net, random_network(7, 12, 20));
/// ```
pub fn random_network(seed: u64, facility_count: usize, max_coord: Coord) -> Network {
    if facility_count < 2 || max_coord < 1 {
        return Network::new();
    }
    let side = 2 * i64::from(max_coord);
    if facility_count as i64 > side * side {
        return Network::new();
    }

    let mut rng = create_rng(seed);
    let mut occupied = BTreeSet::new();
    let mut facilities = Vec::with_capacity(facility_count + 1);
    let mut draws = 0;
    while facilities.len() < facility_count && draws < facility_count * 2 {
        draws += 1;
        let at = random_location(&mut rng, max_coord);
        let base: ResourceVector = Resource::ALL
            .iter()
            .map(|&r| (r, rng.random_range(-MAX_QUANTITY..=MAX_QUANTITY)))
            .collect();
        if occupied.insert(at) {
            facilities.push(Facility::new(at, base));
        }
    }

    let total = facilities
        .iter()
        .map(Facility::base)
        .fold(ResourceVector::new(), |sum, base| sum + base);
    let shortfall = -total.negative_part();
    if !shortfall.is_empty() {
        balance(&mut facilities, &occupied, &mut rng, max_coord, shortfall);
    }
    debug!(event = "random_network", seed, facilities = facilities.len(), draws);
    Network::from_facilities(facilities)
}

fn random_location<R: Rng + ?Sized>(rng: &mut R, max_coord: Coord) -> Location {
    Location::new(
        rng.random_range(-max_coord..max_coord),
        rng.random_range(-max_coord..max_coord),
    )
}

/// Adds a facility supplying `shortfall` on a free cell, or folds it into the
/// first facility when the square is full.
fn balance<R: Rng + ?Sized>(
    facilities: &mut Vec<Facility>,
    occupied: &BTreeSet<Location>,
    rng: &mut R,
    max_coord: Coord,
    shortfall: ResourceVector,
) {
    let free = (0..64)
        .map(|_| random_location(rng, max_coord))
        .find(|at| !occupied.contains(at))
        .or_else(|| {
            (-max_coord..max_coord)
                .flat_map(|x| (-max_coord..max_coord).map(move |y| Location::new(x, y)))
                .find(|at| !occupied.contains(at))
        });
    match free {
        Some(at) => facilities.push(Facility::new(at, shortfall)),
        None => {
            if let Some(host) = facilities.first_mut() {
                *host = Facility::new(host.location(), host.base() + shortfall);
            }
        }
    }
}
