//! Geometric junction candidates.
//!
//! # Algorithm
//!
//! For every pair of facilities `a < b` with `o = b - a`, the candidate
//! junctions are the points where shortest octile paths between the two
//! can bend:
//!
//! - the two Hanan-grid corners `(ax, by)` and `(bx, ay)` when `o` is not
//!   axis-aligned;
//! - the two crossings of the diagonals through `a` and `b`, when they land
//!   on integer points (`ax + ay + bx + by` even) and `|ox| != |oy|`;
//! - the two points where a straight run from one endpoint meets a
//!   diagonal run from the other, chosen by the octant of `o`.
//!
//! Each point is tallied by how many pairs propose it. Points that already
//! hold a place are dropped, and the rest are ranked by tally, then by
//! location, both descending.
//!
//! # Complexity
//!
//! O(f² log f) for f facilities.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::SolveError;
use crate::models::{Location, Network};

/// Relative position of `b` seen from `a`, by sign agreement and dominant
/// axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Octant {
    /// Same signs, mostly horizontal.
    SameWide,
    /// Same signs, mostly vertical or diagonal.
    SameTall,
    /// Opposite signs (or one axis zero), mostly horizontal.
    MixedWide,
    /// Opposite signs (or one axis zero), mostly vertical or diagonal.
    MixedTall,
}

impl Octant {
    fn classify(o: Location) -> Option<Self> {
        if o.x == 0 && o.y == 0 {
            return None;
        }
        let same = o.x.signum() == o.y.signum();
        let wide = o.x.abs() > o.y.abs();
        Some(match (same, wide) {
            (true, true) => Octant::SameWide,
            (true, false) => Octant::SameTall,
            (false, true) => Octant::MixedWide,
            (false, false) => Octant::MixedTall,
        })
    }
}

/// Bend points proposed by one facility pair.
fn pair_candidates(a: Location, b: Location) -> Result<Vec<Location>, SolveError> {
    let o = b - a;
    let octant = Octant::classify(o).ok_or(SolveError::UnclassifiableOctant { a, b })?;
    let mut points = Vec::with_capacity(6);

    if o.x != 0 && o.y != 0 {
        points.push(Location::new(a.x, b.y));
        points.push(Location::new(b.x, a.y));
    }

    if (a.x + a.y + b.x + b.y) % 2 == 0 && o.x.abs() != o.y.abs() {
        points.push(Location::new(
            (a.x + a.y + b.x - b.y) / 2,
            (a.x + a.y - b.x + b.y) / 2,
        ));
        points.push(Location::new(
            (a.x - a.y + b.x + b.y) / 2,
            (-a.x + a.y + b.x + b.y) / 2,
        ));
    }

    let (p, q) = match octant {
        Octant::SameWide => (
            Location::new(b.x + a.y - b.y, a.y),
            Location::new(a.x + b.y - a.y, b.y),
        ),
        Octant::SameTall => (
            Location::new(a.x, b.y + a.x - b.x),
            Location::new(b.x, a.y + b.x - a.x),
        ),
        Octant::MixedTall => (
            Location::new(a.x, b.y - a.x + b.x),
            Location::new(b.x, a.y - b.x + a.x),
        ),
        Octant::MixedWide => (
            Location::new(b.x - a.y + b.y, a.y),
            Location::new(a.x - b.y + a.y, b.y),
        ),
    };
    points.push(p);
    points.push(q);
    Ok(points)
}

/// Ranks candidate junction locations for `net`.
///
/// Returns at most `count` `(location, tally)` pairs, best first. Fewer
/// are returned when fewer candidates exist.
///
/// # Errors
///
/// [`SolveError::UnclassifiableOctant`] if two facilities coincide, which a
/// well-formed network never allows.
///
/// # Examples
///
/// ```
/// use u_logistics::constructive::junction_candidates;
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let one = ResourceVector::new().with(Resource::Copper, 1);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), one).unwrap();
/// net.add_factory(Location::new(5, 5), one).unwrap();
///
/// let junctions = junction_candidates(&net, 10).unwrap();
/// assert_eq!(
///     junctions,
///     vec![(Location::new(5, 0), 1), (Location::new(0, 5), 1)]
/// );
/// ```
pub fn junction_candidates(
    net: &Network,
    count: usize,
) -> Result<Vec<(Location, usize)>, SolveError> {
    let factories: Vec<Location> = net
        .facilities()
        .filter(|f| !f.is_junction())
        .map(|f| f.location())
        .collect();

    let mut tally: BTreeMap<Location, usize> = BTreeMap::new();
    for (i, &a) in factories.iter().enumerate() {
        for &b in &factories[i + 1..] {
            for point in pair_candidates(a, b)? {
                *tally.entry(point).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(Location, usize)> = tally
        .into_iter()
        .filter(|(loc, _)| !net.has_place(*loc))
        .collect();
    ranked.sort_by(|x, y| y.1.cmp(&x.1).then(y.0.cmp(&x.0)));
    ranked.truncate(count);
    debug!(event = "junction_candidates", factories = factories.len(), returned = ranked.len());
    Ok(ranked)
}
