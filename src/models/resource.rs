//! Resource catalog and signed resource vectors.

use std::fmt;
use std::iter::FromIterator;
use std::ops::{Add, AddAssign, Index, IndexMut, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Signed resource quantity. Negative is demand, positive is supply.
pub type Quant = i32;

/// A resource type from the closed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Copper,
    Steel,
    Iron,
    Stone,
    Uranium,
    Circuits,
    Fish,
    Wood,
    NuclearFuel,
    Wire,
    Engine,
    Gear,
}

impl Resource {
    /// Number of resource types in the catalog.
    pub const COUNT: usize = 12;

    /// Every resource, in catalog order.
    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Copper,
        Resource::Steel,
        Resource::Iron,
        Resource::Stone,
        Resource::Uranium,
        Resource::Circuits,
        Resource::Fish,
        Resource::Wood,
        Resource::NuclearFuel,
        Resource::Wire,
        Resource::Engine,
        Resource::Gear,
    ];

    /// Slot of this resource in a [`ResourceVector`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resource at the given slot, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A fixed-width signed quantity per resource.
///
/// Used both for a facility's demand/supply and for the pickup (positive)
/// or dropoff (negative) command at a route stop.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Resource, ResourceVector};
///
/// let v = ResourceVector::new()
///     .with(Resource::Copper, 5)
///     .with(Resource::Wire, -2);
/// assert_eq!(v[Resource::Copper], 5);
/// assert_eq!(v.positive(), vec![Resource::Copper]);
/// assert_eq!(v.negative_part()[Resource::Wire], -2);
/// assert_eq!(v.positive_part() + v.negative_part(), v);
/// assert!(!v.all_non_negative());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceVector([Quant; Resource::COUNT]);

impl ResourceVector {
    /// The all-zero vector.
    pub const fn new() -> Self {
        Self([0; Resource::COUNT])
    }

    /// Returns this vector with `resource` set to `quantity`.
    pub fn with(mut self, resource: Resource, quantity: Quant) -> Self {
        self.0[resource.index()] = quantity;
        self
    }

    /// Quantity of a single resource.
    pub fn get(&self, resource: Resource) -> Quant {
        self.0[resource.index()]
    }

    /// Sets the quantity of a single resource.
    pub fn set(&mut self, resource: Resource, quantity: Quant) {
        self.0[resource.index()] = quantity;
    }

    /// Iterates `(resource, quantity)` over every slot, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, Quant)> + '_ {
        Resource::ALL.iter().map(move |&r| (r, self.get(r)))
    }

    /// Returns `true` if every slot is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&q| q == 0)
    }

    /// Returns `true` if no slot is negative.
    pub fn all_non_negative(&self) -> bool {
        self.0.iter().all(|&q| q >= 0)
    }

    /// Resources with a negative quantity.
    pub fn negative(&self) -> Vec<Resource> {
        self.iter().filter(|&(_, q)| q < 0).map(|(r, _)| r).collect()
    }

    /// Resources with a positive quantity.
    pub fn positive(&self) -> Vec<Resource> {
        self.iter().filter(|&(_, q)| q > 0).map(|(r, _)| r).collect()
    }

    /// Copy with every positive slot zeroed.
    pub fn negative_part(&self) -> Self {
        Self(self.0.map(|q| q.min(0)))
    }

    /// Copy with every negative slot zeroed.
    pub fn positive_part(&self) -> Self {
        Self(self.0.map(|q| q.max(0)))
    }

    /// Sum of all slots, i.e. the number of units on board when the vector
    /// describes a vehicle load.
    pub fn total(&self) -> i64 {
        self.0.iter().map(|&q| i64::from(q)).sum()
    }
}

impl Index<Resource> for ResourceVector {
    type Output = Quant;

    fn index(&self, resource: Resource) -> &Quant {
        &self.0[resource.index()]
    }
}

impl IndexMut<Resource> for ResourceVector {
    fn index_mut(&mut self, resource: Resource) -> &mut Quant {
        &mut self.0[resource.index()]
    }
}

impl Add for ResourceVector {
    type Output = ResourceVector;

    fn add(mut self, rhs: ResourceVector) -> ResourceVector {
        self += rhs;
        self
    }
}

impl AddAssign for ResourceVector {
    fn add_assign(&mut self, rhs: ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl Sub for ResourceVector {
    type Output = ResourceVector;

    fn sub(mut self, rhs: ResourceVector) -> ResourceVector {
        self -= rhs;
        self
    }
}

impl SubAssign for ResourceVector {
    fn sub_assign(&mut self, rhs: ResourceVector) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl Neg for ResourceVector {
    type Output = ResourceVector;

    fn neg(self) -> ResourceVector {
        Self(self.0.map(|q| -q))
    }
}

impl FromIterator<(Resource, Quant)> for ResourceVector {
    /// Collects pairs into a vector; repeated resources accumulate.
    fn from_iter<I: IntoIterator<Item = (Resource, Quant)>>(iter: I) -> Self {
        let mut v = ResourceVector::new();
        for (r, q) in iter {
            v[r] += q;
        }
        v
    }
}

impl fmt::Display for ResourceVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (r, q) in self.iter().filter(|&(_, q)| q != 0) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{r:?}: {q}")?;
            first = false;
        }
        write!(f, "}}")
    }
}
