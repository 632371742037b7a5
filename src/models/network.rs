//! Facilities, routes, and the ledger that ties them together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Facility, Location, Resource, ResourceVector, Route, Stop};
use crate::error::{AllocationError, NetworkError};

/// Index of a route in a [`Network`], in insertion order.
pub type RouteKey = usize;

type LedgerOp = fn(&mut Facility, &ResourceVector) -> Result<(), AllocationError>;

/// A logistics network: facilities keyed by location plus the routes
/// serving them.
///
/// Every route command is claimed from its facility's unallocated
/// capacity, so a facility's `unallocated` is always its base minus the
/// commands of all stops calling there. All mutators keep that ledger in
/// sync and leave the network untouched when they return `Err`.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Location, Network, Resource, ResourceVector};
///
/// let one = ResourceVector::new().with(Resource::Copper, 1);
/// let mine = Location::new(0, 0);
/// let mill = Location::new(0, 1);
///
/// let mut net = Network::new();
/// net.add_factory(mine, one).unwrap();
/// net.add_factory(mill, -one).unwrap();
/// assert_eq!(net.deficit(None), vec![mill]);
///
/// let key = net.add_route_pair(mine, mill, one, -one).unwrap();
/// assert!(net.deficit(None).is_empty());
///
/// // over-claiming is rejected and changes nothing
/// assert!(net.add_route_pair(mine, mill, one, -one).is_err());
/// assert_eq!(net.route_count(), 1);
///
/// net.erase_route(key).unwrap();
/// assert_eq!(net.deficit(None), vec![mill]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NetworkRepr", into = "NetworkRepr")]
pub struct Network {
    places: BTreeMap<Location, Facility>,
    routes: Vec<Route>,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a route-less network. A later facility at the same location
    /// replaces an earlier one.
    pub fn from_facilities<I: IntoIterator<Item = Facility>>(facilities: I) -> Self {
        let places = facilities
            .into_iter()
            .map(|mut f| {
                f.reset_allocated();
                (f.location(), f)
            })
            .collect();
        Self {
            places,
            routes: Vec::new(),
        }
    }

    // ---- queries ----

    /// Number of facilities with a non-zero base (junctions excluded).
    pub fn facility_count(&self) -> usize {
        self.places.values().filter(|f| !f.is_junction()).count()
    }

    /// Number of junctions.
    pub fn junction_count(&self) -> usize {
        self.places.values().filter(|f| f.is_junction()).count()
    }

    /// Number of places, facilities and junctions alike.
    pub fn place_count(&self) -> usize {
        self.places.len()
    }

    /// Number of routes.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// All places in location order.
    pub fn facilities(&self) -> impl Iterator<Item = &Facility> + '_ {
        self.places.values()
    }

    /// All place locations in order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.places.keys().copied()
    }

    /// All routes in insertion order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The place at `location`, if any.
    pub fn facility(&self, location: Location) -> Option<&Facility> {
        self.places.get(&location)
    }

    /// Returns `true` if a facility or junction sits at `location`.
    pub fn has_place(&self, location: Location) -> bool {
        self.places.contains_key(&location)
    }

    /// The route with the given key, if any.
    pub fn route(&self, key: RouteKey) -> Option<&Route> {
        self.routes.get(key)
    }

    /// Locations visited by a route, in order.
    pub fn route_stops(&self, key: RouteKey) -> Result<Vec<Location>, NetworkError> {
        Ok(self.route_ref(key)?.locations())
    }

    /// Location of one stop.
    pub fn stop(&self, key: RouteKey, index: usize) -> Result<Location, NetworkError> {
        Ok(self.route_ref(key)?.location(index)?)
    }

    /// Command of one stop.
    pub fn stop_command(&self, key: RouteKey, index: usize) -> Result<ResourceVector, NetworkError> {
        Ok(self.route_ref(key)?.command(index)?)
    }

    /// Keys of the routes calling at `location`.
    pub fn routes_visiting(&self, location: Location) -> Vec<RouteKey> {
        (0..self.routes.len())
            .filter(|&k| self.routes[k].visits(location))
            .collect()
    }

    /// Places with unrouted demand, for one resource or any.
    pub fn deficit(&self, resource: Option<Resource>) -> Vec<Location> {
        self.places
            .values()
            .filter(|f| f.has_deficit(resource))
            .map(Facility::location)
            .collect()
    }

    /// Places with unclaimed supply, for one resource or any.
    pub fn surplus(&self, resource: Option<Resource>) -> Vec<Location> {
        self.places
            .values()
            .filter(|f| f.has_surplus(resource))
            .map(Facility::location)
            .collect()
    }

    /// Sum of every facility's base vector.
    pub fn total_base(&self) -> ResourceVector {
        self.places
            .values()
            .fold(ResourceVector::new(), |acc, f| acc + f.base())
    }

    // ---- places ----

    /// Adds a facility, returning the one it replaced.
    ///
    /// Any allocation carried by `facility` is reset. Replacing a facility
    /// that routes still call at is rejected with
    /// [`NetworkError::Occupied`].
    pub fn insert_facility(&mut self, mut facility: Facility) -> Result<Option<Facility>, NetworkError> {
        let at = facility.location();
        if self.routes.iter().any(|r| r.visits(at)) {
            return Err(NetworkError::Occupied(at));
        }
        facility.reset_allocated();
        let previous = self.places.insert(at, facility);
        if previous.is_some() {
            debug!(event = "facility_replaced", location = %at);
        }
        Ok(previous)
    }

    /// Adds a facility with the given base vector at `location`.
    pub fn add_factory(
        &mut self,
        location: Location,
        base: ResourceVector,
    ) -> Result<Option<Facility>, NetworkError> {
        self.insert_facility(Facility::new(location, base))
    }

    /// Adds a junction at `location`.
    pub fn create_junction(&mut self, location: Location) -> Result<Option<Facility>, NetworkError> {
        self.insert_facility(Facility::junction(location))
    }

    /// Removes a place after dropping it from every route.
    ///
    /// If some route cannot lose the stop (it would fall below two stops),
    /// the whole call is undone and [`NetworkError::StopNotRemovable`] is
    /// returned.
    pub fn erase_place(&mut self, location: Location) -> Result<Facility, NetworkError> {
        if !self.places.contains_key(&location) {
            return Err(NetworkError::UnknownFacility(location));
        }
        let snapshot = self.clone();
        for key in 0..self.routes.len() {
            while self.routes[key].visits(location) {
                if !matches!(self.drop_stop(key, location, 0), Ok(true)) {
                    *self = snapshot;
                    return Err(NetworkError::StopNotRemovable {
                        route: key,
                        location,
                    });
                }
            }
        }
        self.places
            .remove(&location)
            .ok_or(NetworkError::UnknownFacility(location))
    }

    /// [`erase_place`](Self::erase_place) restricted to non-junctions.
    pub fn erase_factory(&mut self, location: Location) -> Result<Facility, NetworkError> {
        self.expect_kind(location, false)?;
        self.erase_place(location)
    }

    /// [`erase_place`](Self::erase_place) restricted to junctions.
    pub fn erase_junction(&mut self, location: Location) -> Result<Facility, NetworkError> {
        self.expect_kind(location, true)?;
        self.erase_place(location)
    }

    // ---- routes ----

    /// Adds a route, claiming every stop's command from its facility.
    ///
    /// Stops are allocated in order; on the first rejection every stop
    /// already claimed by this call is released again.
    pub fn add_route(&mut self, route: Route) -> Result<RouteKey, NetworkError> {
        if let Err(err) = self.apply_stops(route.stops(), Facility::allocate, Facility::deallocate) {
            trace!(event = "route_rejected", stops = route.len(), error = %err);
            return Err(err);
        }
        self.routes.push(route);
        Ok(self.routes.len() - 1)
    }

    /// Adds a route built from `stops`.
    pub fn add_route_stops(&mut self, stops: Vec<Stop>) -> Result<RouteKey, NetworkError> {
        self.add_route(Route::new(stops)?)
    }

    /// Adds a route visiting `locations`; missing commands are zero.
    pub fn add_route_keys(
        &mut self,
        locations: &[Location],
        commands: &[ResourceVector],
    ) -> Result<RouteKey, NetworkError> {
        self.add_route(Route::from_keys(locations, commands)?)
    }

    /// Adds a two-stop shuttle.
    pub fn add_route_pair(
        &mut self,
        from: Location,
        to: Location,
        from_command: ResourceVector,
        to_command: ResourceVector,
    ) -> Result<RouteKey, NetworkError> {
        self.add_route(Route::between(from, to, from_command, to_command))
    }

    /// Removes a route and releases its commands.
    ///
    /// Keys of later routes shift down by one.
    pub fn erase_route(&mut self, key: RouteKey) -> Result<Route, NetworkError> {
        let route = self.route_ref(key)?;
        let stops = route.stops().to_vec();
        self.apply_stops(&stops, Facility::deallocate, Facility::allocate)?;
        Ok(self.routes.remove(key))
    }

    /// Removes the first route equal to `route`, if there is one.
    pub fn erase_route_matching(&mut self, route: &Route) -> Result<Option<Route>, NetworkError> {
        match self.routes.iter().position(|r| r == route) {
            Some(key) => self.erase_route(key).map(Some),
            None => Ok(None),
        }
    }

    /// Removes every route, releasing all allocations.
    pub fn erase_all_routes(&mut self) -> Vec<Route> {
        for facility in self.places.values_mut() {
            facility.reset_allocated();
        }
        std::mem::take(&mut self.routes)
    }

    /// Inserts a stop into a route, claiming its command first.
    pub fn add_stop(
        &mut self,
        key: RouteKey,
        location: Location,
        position: usize,
        command: ResourceVector,
    ) -> Result<(), NetworkError> {
        self.route_ref(key)?;
        self.apply_at(location, &command, Facility::allocate)?;
        self.routes[key].insert_stop(location, position, command);
        Ok(())
    }

    /// Replaces the command of one stop.
    ///
    /// The old command is released and the new one claimed; if the new one
    /// is rejected the old claim is restored.
    pub fn set_stop_command(
        &mut self,
        key: RouteKey,
        index: usize,
        command: ResourceVector,
    ) -> Result<(), NetworkError> {
        let old = *self.route_ref(key)?.stop(index)?;
        self.apply_at(old.location, &old.command, Facility::deallocate)?;
        if let Err(err) = self.apply_at(old.location, &command, Facility::allocate) {
            let restored = self.apply_at(old.location, &old.command, Facility::allocate);
            debug_assert!(restored.is_ok(), "ledger restore failed at {}", old.location);
            return Err(err);
        }
        self.routes[key].set_command(index, command)?;
        Ok(())
    }

    /// Removes the first stop at `location` at or after `search_from` and
    /// releases its command.
    ///
    /// Returns `Ok(false)` if the route has only two stops or never calls
    /// there at or after `search_from`.
    pub fn drop_stop(
        &mut self,
        key: RouteKey,
        location: Location,
        search_from: usize,
    ) -> Result<bool, NetworkError> {
        let route = self
            .routes
            .get_mut(key)
            .ok_or(NetworkError::UnknownRoute(key))?;
        let Some((index, stop)) = route.remove_stop(location, search_from)? else {
            return Ok(false);
        };
        if let Err(err) = self.apply_at(stop.location, &stop.command, Facility::deallocate) {
            self.routes[key].insert_stop(stop.location, index, stop.command);
            return Err(err);
        }
        Ok(true)
    }

    /// Merges consecutive duplicate stops of a route.
    ///
    /// Commands at a location keep their total, so the ledger is untouched.
    pub fn merge_repeated_stops(&mut self, key: RouteKey) -> Result<usize, NetworkError> {
        self.routes
            .get_mut(key)
            .map(Route::merge_repeated_stops)
            .ok_or(NetworkError::UnknownRoute(key))
    }

    /// Reverses a route, keeping its first stop.
    pub fn reverse_route(&mut self, key: RouteKey) -> Result<(), NetworkError> {
        self.routes
            .get_mut(key)
            .map(Route::reverse)
            .ok_or(NetworkError::UnknownRoute(key))
    }

    /// Rotates a route by `n` stops.
    pub fn rotate_route(&mut self, key: RouteKey, n: usize) -> Result<(), NetworkError> {
        self.routes
            .get_mut(key)
            .map(|r| r.rotate(n))
            .ok_or(NetworkError::UnknownRoute(key))
    }

    // ---- ledger helpers ----

    fn route_ref(&self, key: RouteKey) -> Result<&Route, NetworkError> {
        self.routes.get(key).ok_or(NetworkError::UnknownRoute(key))
    }

    fn expect_kind(&self, location: Location, junction: bool) -> Result<(), NetworkError> {
        let facility = self
            .places
            .get(&location)
            .ok_or(NetworkError::UnknownFacility(location))?;
        if facility.is_junction() != junction {
            return Err(NetworkError::WrongKind {
                location,
                expected: if junction { "junction" } else { "factory" },
            });
        }
        Ok(())
    }

    fn apply_at(
        &mut self,
        at: Location,
        command: &ResourceVector,
        op: LedgerOp,
    ) -> Result<(), NetworkError> {
        let facility = self
            .places
            .get_mut(&at)
            .ok_or(NetworkError::UnknownFacility(at))?;
        op(facility, command).map_err(|source| NetworkError::Allocation { at, source })
    }

    /// Applies `op` to every stop in order, undoing the applied prefix with
    /// `undo` on the first failure.
    fn apply_stops(&mut self, stops: &[Stop], op: LedgerOp, undo: LedgerOp) -> Result<(), NetworkError> {
        for (done, stop) in stops.iter().enumerate() {
            if let Err(err) = self.apply_at(stop.location, &stop.command, op) {
                for prev in stops[..done].iter().rev() {
                    let undone = self.apply_at(prev.location, &prev.command, undo);
                    debug_assert!(undone.is_ok(), "ledger rollback failed at {}", prev.location);
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Persisted shape of a [`Network`]: facilities as a list, allocation
/// rebuilt by replaying the routes.
#[derive(Serialize, Deserialize)]
struct NetworkRepr {
    facilities: Vec<Facility>,
    routes: Vec<Route>,
}

impl TryFrom<NetworkRepr> for Network {
    type Error = NetworkError;

    fn try_from(repr: NetworkRepr) -> Result<Self, NetworkError> {
        let mut net = Network::from_facilities(repr.facilities);
        for route in repr.routes {
            net.add_route(route)?;
        }
        Ok(net)
    }
}

impl From<Network> for NetworkRepr {
    fn from(net: Network) -> Self {
        NetworkRepr {
            facilities: net.places.into_values().collect(),
            routes: net.routes,
        }
    }
}
