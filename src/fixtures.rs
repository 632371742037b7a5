//! Canonical networks shared by the unit tests.

use crate::models::{Facility, Location, Network, Quant, Resource, ResourceVector};

pub(crate) fn copper(q: Quant) -> ResourceVector {
    ResourceVector::new().with(Resource::Copper, q)
}

pub(crate) fn iron(q: Quant) -> ResourceVector {
    ResourceVector::new().with(Resource::Iron, q)
}

fn place(x: i32, y: i32, quantities: &[(Resource, Quant)]) -> Facility {
    Facility::new(Location::new(x, y), quantities.iter().copied().collect())
}

/// One copper mine next to one consumer.
pub(crate) fn basic() -> Network {
    Network::from_facilities([
        place(0, 0, &[(Resource::Copper, 1)]),
        place(0, 1, &[(Resource::Copper, -1)]),
    ])
}

/// One supplier serving two consumers.
pub(crate) fn dual_serve() -> Network {
    Network::from_facilities([
        place(0, 0, &[(Resource::Copper, 3)]),
        place(2, 1, &[(Resource::Copper, -1)]),
        place(1, 2, &[(Resource::Copper, -2)]),
    ])
}

/// One consumer of two resources, each produced elsewhere.
pub(crate) fn dual_res_produce() -> Network {
    Network::from_facilities([
        place(0, 0, &[(Resource::Copper, -2), (Resource::Iron, -2)]),
        place(2, 1, &[(Resource::Copper, 2)]),
        place(1, 2, &[(Resource::Iron, 2)]),
    ])
}

/// Two production chains a hundred cells apart.
pub(crate) fn two_zones() -> Network {
    Network::from_facilities([
        place(0, 0, &[(Resource::Copper, -4), (Resource::Circuits, 2)]),
        place(0, 2, &[(Resource::Uranium, -1), (Resource::NuclearFuel, 4)]),
        place(100, 0, &[(Resource::Copper, 4), (Resource::Circuits, -2)]),
        place(100, 2, &[(Resource::Uranium, 1), (Resource::NuclearFuel, -4)]),
    ])
}

/// Three facilities each turning the previous one's output into the next
/// one's input.
pub(crate) fn tri_cycle() -> Network {
    Network::from_facilities([
        place(0, 0, &[(Resource::Iron, 1), (Resource::Steel, -1)]),
        place(2, 1, &[(Resource::Copper, -1), (Resource::Steel, 1)]),
        place(1, 2, &[(Resource::Copper, 1), (Resource::Iron, -1)]),
    ])
}

/// Every canonical network.
pub(crate) fn all() -> Vec<(&'static str, Network)> {
    vec![
        ("basic", basic()),
        ("dual_serve", dual_serve()),
        ("dual_res_produce", dual_res_produce()),
        ("two_zones", two_zones()),
        ("tri_cycle", tri_cycle()),
    ]
}
