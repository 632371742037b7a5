//! Facilities and their allocation ledger.

use serde::{Deserialize, Serialize};

use super::{Location, Quant, Resource, ResourceVector};
use crate::error::AllocationError;

/// A located producer/consumer of resources.
///
/// `base` is the facility's fixed net demand (negative) or supply
/// (positive). `unallocated` is the part of `base` not yet claimed by any
/// route command; it starts equal to `base` and only moves towards zero.
/// A facility with an all-zero base is a junction, a pure waypoint.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Facility, Location, Resource, ResourceVector};
///
/// let supply = ResourceVector::new().with(Resource::Copper, 5);
/// let mut mine = Facility::new(Location::new(0, 0), supply);
///
/// assert!(mine.allocate(&supply).is_ok());
/// assert!(mine.unallocated().is_empty());
/// // no double-spend
/// assert!(mine.allocate(&supply).is_err());
///
/// mine.deallocate(&supply).unwrap();
/// assert_eq!(mine.unallocated(), supply);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    location: Location,
    base: ResourceVector,
    unallocated: ResourceVector,
}

impl Facility {
    /// Creates a facility with nothing allocated yet.
    pub fn new(location: Location, base: ResourceVector) -> Self {
        Self {
            location,
            base,
            unallocated: base,
        }
    }

    /// Creates a junction (all-zero base).
    pub fn junction(location: Location) -> Self {
        Self::new(location, ResourceVector::new())
    }

    /// Where this facility sits.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Fixed net demand/supply.
    pub fn base(&self) -> ResourceVector {
        self.base
    }

    /// Capacity not yet claimed by any route.
    pub fn unallocated(&self) -> ResourceVector {
        self.unallocated
    }

    /// Capacity claimed by routes, `base - unallocated`.
    pub fn allocated(&self) -> ResourceVector {
        self.base - self.unallocated
    }

    /// Returns `true` for a pure waypoint.
    pub fn is_junction(&self) -> bool {
        self.base.is_empty()
    }

    /// Claims `command` from the unallocated capacity.
    ///
    /// Every slot must point in the direction of `base` (or be zero) and fit
    /// in what is left. The whole vector is checked on a scratch copy before
    /// anything is committed, so a rejected call changes nothing.
    pub fn allocate(&mut self, command: &ResourceVector) -> Result<(), AllocationError> {
        let mut scratch = self.unallocated;
        for (resource, requested) in command.iter() {
            let base = self.base[resource];
            if requested != 0 && requested.signum() != base.signum() {
                return Err(AllocationError::WrongDirection {
                    resource,
                    requested,
                    base,
                });
            }
            let available = scratch[resource];
            if available.abs() < requested.abs() {
                return Err(AllocationError::Insufficient {
                    resource,
                    requested,
                    available,
                });
            }
            scratch[resource] -= requested;
        }
        self.unallocated = scratch;
        Ok(())
    }

    /// Returns a previously allocated `command` to the unallocated capacity.
    ///
    /// Takes the same vector that was passed to [`allocate`](Self::allocate);
    /// each slot may not exceed what is currently allocated.
    pub fn deallocate(&mut self, command: &ResourceVector) -> Result<(), AllocationError> {
        let allocated = self.allocated();
        let mut scratch = self.unallocated;
        for (resource, requested) in command.iter() {
            if requested == 0 {
                continue;
            }
            let base = self.base[resource];
            if requested.signum() != base.signum() {
                return Err(AllocationError::WrongDirection {
                    resource,
                    requested,
                    base,
                });
            }
            let available: Quant = allocated[resource];
            if available.abs() < requested.abs() {
                return Err(AllocationError::Insufficient {
                    resource,
                    requested,
                    available,
                });
            }
            scratch[resource] += requested;
        }
        self.unallocated = scratch;
        Ok(())
    }

    /// Releases every allocation.
    pub fn reset_allocated(&mut self) {
        self.unallocated = self.base;
    }

    /// Returns `true` if some demand of this facility is still unrouted.
    pub fn has_deficit(&self, resource: Option<Resource>) -> bool {
        match resource {
            Some(r) => self.unallocated[r] < 0,
            None => !self.unallocated.negative().is_empty(),
        }
    }

    /// Returns `true` if some supply of this facility is still unclaimed.
    pub fn has_surplus(&self, resource: Option<Resource>) -> bool {
        match resource {
            Some(r) => self.unallocated[r] > 0,
            None => !self.unallocated.positive().is_empty(),
        }
    }
}
