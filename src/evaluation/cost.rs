//! Weighted multi-metric transport cost.
//!
//! # Metrics
//!
//! | Metric | Value |
//! |---|---|
//! | `num_junctions` | junction count |
//! | `base_track_length` | length of every distinct track segment |
//! | `shared_track_length` | length of every extra traversal of a segment |
//! | `max_length` | longest route |
//! | `num_routes` | route count |
//! | `max_carry_time` / `total_carry_time` | route carry time, max / sum |
//! | `max_peak_capacity` / `total_peak_capacity` | route peak load, max / sum |
//!
//! A segment is an undirected pair of consecutive stops (wraparound
//! included). A segment traversed `m` times costs
//! `length × (base + (m - 1) × shared)`, so shared track is charged at a
//! discount.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::distance::{distance, Distance};
use crate::models::{Location, Network};

/// A cost metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NumJunctions,
    BaseTrackLength,
    SharedTrackLength,
    MaxLength,
    NumRoutes,
    MaxCarryTime,
    TotalCarryTime,
    MaxPeakCapacity,
    TotalPeakCapacity,
}

impl Metric {
    /// Every metric, in declaration order.
    pub const ALL: [Metric; 9] = [
        Metric::NumJunctions,
        Metric::BaseTrackLength,
        Metric::SharedTrackLength,
        Metric::MaxLength,
        Metric::NumRoutes,
        Metric::MaxCarryTime,
        Metric::TotalCarryTime,
        Metric::MaxPeakCapacity,
        Metric::TotalPeakCapacity,
    ];
}

/// Weight per metric. Metrics left out of a config weigh zero.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::{CostWeights, Metric};
///
/// let w: CostWeights = toml::from_str("num_routes = 2.0\nbase_track_length = 1.0").unwrap();
/// assert_eq!(w.weight(Metric::NumRoutes), 2.0);
/// assert_eq!(w.weight(Metric::MaxLength), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    pub num_junctions: f64,
    pub base_track_length: f64,
    pub shared_track_length: f64,
    pub max_length: f64,
    pub num_routes: f64,
    pub max_carry_time: f64,
    pub total_carry_time: f64,
    pub max_peak_capacity: f64,
    pub total_peak_capacity: f64,
}

impl CostWeights {
    /// All weights zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Weighs every metric: structure heavily, load lightly.
    pub fn all_metrics() -> Self {
        Self {
            num_junctions: 4.0,
            base_track_length: 1.0,
            shared_track_length: 0.5,
            max_length: 0.5,
            num_routes: 2.0,
            max_carry_time: 0.5,
            total_carry_time: 0.1,
            max_peak_capacity: 0.5,
            total_peak_capacity: 0.1,
        }
    }

    /// Structure only: junctions, track and route count.
    pub fn simple() -> Self {
        Self {
            num_junctions: 4.0,
            base_track_length: 1.0,
            shared_track_length: 0.5,
            num_routes: 2.0,
            ..Self::default()
        }
    }

    /// Returns these weights with `metric` set to `weight`.
    pub fn with(mut self, metric: Metric, weight: f64) -> Self {
        *self.slot(metric) = weight;
        self
    }

    /// Weight of one metric.
    pub fn weight(&self, metric: Metric) -> f64 {
        match metric {
            Metric::NumJunctions => self.num_junctions,
            Metric::BaseTrackLength => self.base_track_length,
            Metric::SharedTrackLength => self.shared_track_length,
            Metric::MaxLength => self.max_length,
            Metric::NumRoutes => self.num_routes,
            Metric::MaxCarryTime => self.max_carry_time,
            Metric::TotalCarryTime => self.total_carry_time,
            Metric::MaxPeakCapacity => self.max_peak_capacity,
            Metric::TotalPeakCapacity => self.total_peak_capacity,
        }
    }

    /// Returns `true` if every weight is finite.
    pub fn is_finite(&self) -> bool {
        Metric::ALL.iter().all(|&m| self.weight(m).is_finite())
    }

    fn slot(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::NumJunctions => &mut self.num_junctions,
            Metric::BaseTrackLength => &mut self.base_track_length,
            Metric::SharedTrackLength => &mut self.shared_track_length,
            Metric::MaxLength => &mut self.max_length,
            Metric::NumRoutes => &mut self.num_routes,
            Metric::MaxCarryTime => &mut self.max_carry_time,
            Metric::TotalCarryTime => &mut self.total_carry_time,
            Metric::MaxPeakCapacity => &mut self.max_peak_capacity,
            Metric::TotalPeakCapacity => &mut self.total_peak_capacity,
        }
    }
}

/// Scores a network as the weighted sum of its metrics.
///
/// Metrics with zero weight are not computed.
///
/// # Examples
///
/// ```
/// use u_logistics::evaluation::{CostFunction, CostWeights, Metric};
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let one = ResourceVector::new().with(Resource::Copper, 1);
/// let mut net = Network::new();
/// net.add_factory(Location::new(0, 0), one).unwrap();
/// net.add_factory(Location::new(0, 1), -one).unwrap();
/// net.add_route_pair(Location::new(0, 0), Location::new(0, 1), one, -one).unwrap();
///
/// let cost = CostFunction::new(CostWeights::new().with(Metric::NumRoutes, 2.0));
/// assert!((cost.evaluate(&net) - 2.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostFunction {
    weights: CostWeights,
}

impl CostFunction {
    /// Creates a cost function with the given weights.
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    /// The metric weights.
    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Weighted cost of `net`.
    pub fn evaluate(&self, net: &Network) -> f64 {
        let w = &self.weights;
        let mut cost = 0.0;
        if w.num_junctions != 0.0 {
            cost += w.num_junctions * Self::num_junctions(net) as f64;
        }
        if w.base_track_length != 0.0 || w.shared_track_length != 0.0 {
            cost += self.track_cost(net);
        }
        if w.max_length != 0.0 {
            cost += w.max_length * Self::max_length(net).to_f64();
        }
        if w.num_routes != 0.0 {
            cost += w.num_routes * Self::num_routes(net) as f64;
        }
        if w.max_carry_time != 0.0 {
            cost += w.max_carry_time * Self::max_carry_time(net);
        }
        if w.total_carry_time != 0.0 {
            cost += w.total_carry_time * Self::total_carry_time(net);
        }
        if w.max_peak_capacity != 0.0 {
            cost += w.max_peak_capacity * Self::max_peak_capacity(net) as f64;
        }
        if w.total_peak_capacity != 0.0 {
            cost += w.total_peak_capacity * Self::total_peak_capacity(net) as f64;
        }
        cost
    }

    /// Base plus shared track cost.
    pub fn track_cost(&self, net: &Network) -> f64 {
        let base = self.weights.base_track_length;
        let shared = self.weights.shared_track_length;
        Self::track_length_map(net)
            .into_iter()
            .map(|(mult, length)| length.to_f64() * (base + (mult as f64 - 1.0) * shared))
            .sum()
    }

    /// Number of junctions.
    pub fn num_junctions(net: &Network) -> usize {
        net.junction_count()
    }

    /// Total segment length grouped by how many times the segment is
    /// traversed.
    pub fn track_length_map(net: &Network) -> BTreeMap<usize, Distance> {
        let mut traversals: HashMap<(Location, Location), usize> = HashMap::new();
        for route in net.routes() {
            for (a, b) in route.edges() {
                let key = if a.location <= b.location {
                    (a.location, b.location)
                } else {
                    (b.location, a.location)
                };
                *traversals.entry(key).or_insert(0) += 1;
            }
        }
        let mut by_mult: BTreeMap<usize, Distance> = BTreeMap::new();
        for ((a, b), mult) in traversals {
            *by_mult.entry(mult).or_default() += distance(a, b);
        }
        by_mult
    }

    /// Length of the longest route.
    pub fn max_length(net: &Network) -> Distance {
        net.routes()
            .iter()
            .map(|r| r.length())
            .max()
            .unwrap_or_default()
    }

    /// Number of routes.
    pub fn num_routes(net: &Network) -> usize {
        net.route_count()
    }

    /// Largest route carry time.
    pub fn max_carry_time(net: &Network) -> f64 {
        net.routes()
            .iter()
            .map(|r| r.carry_time())
            .fold(0.0, f64::max)
    }

    /// Sum of route carry times.
    pub fn total_carry_time(net: &Network) -> f64 {
        net.routes().iter().map(|r| r.carry_time()).sum()
    }

    /// Largest route peak load.
    pub fn max_peak_capacity(net: &Network) -> i64 {
        net.routes()
            .iter()
            .map(|r| r.peak_capacity())
            .max()
            .unwrap_or(0)
    }

    /// Sum of route peak loads.
    pub fn total_peak_capacity(net: &Network) -> i64 {
        net.routes().iter().map(|r| r.peak_capacity()).sum()
    }
}
