//! Inclusive address range within one family.

use super::address::{Address, AddressFamily};
use super::CidrBlock;
use crate::error::Error;
use serde::Serialize;
use std::fmt;

/// Inclusive range `first..=last` of addresses of one family.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    family: AddressFamily,
    first: u128,
    last: u128,
}

impl Range {
    /// Create a range from its two endpoints.
    ///
    /// # Returns
    /// * `Err(Error::FamilyMismatch)` - The endpoints are of different families
    /// * `Err(Error::InvalidRange)` - `first` is greater than `last`
    pub fn new(first: Address, last: Address) -> Result<Range, Error> {
        first.family().ensure(last.family())?;
        if first.value() > last.value() {
            return Err(Error::InvalidRange { first, last });
        }
        Ok(Range {
            family: first.family(),
            first: first.value(),
            last: last.value(),
        })
    }

    /// A range holding exactly one address.
    pub fn single(address: Address) -> Range {
        Range {
            family: address.family(),
            first: address.value(),
            last: address.value(),
        }
    }

    pub(crate) fn from_parts(family: AddressFamily, first: u128, last: u128) -> Range {
        debug_assert!(first <= last, "range start after end");
        debug_assert!(last <= family.max_value(), "range past family width");
        Range {
            family,
            first,
            last,
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn first(&self) -> Address {
        Address::from_parts(self.family, self.first)
    }

    pub fn last(&self) -> Address {
        Address::from_parts(self.family, self.last)
    }

    pub(crate) fn first_value(&self) -> u128 {
        self.first
    }

    pub(crate) fn last_value(&self) -> u128 {
        self.last
    }

    /// Number of addresses, `None` only for the whole IPv6 space.
    pub fn address_count(&self) -> Option<u128> {
        (self.last - self.first).checked_add(1)
    }

    pub fn contains_address(&self, address: &Address) -> bool {
        address.family() == self.family
            && self.first <= address.value()
            && address.value() <= self.last
    }

    /// True when every address of `other` is inside this range.
    pub fn contains(&self, other: &Range) -> bool {
        self.family == other.family && self.first <= other.first && other.last <= self.last
    }

    /// True when the ranges share at least one address.
    pub fn intersects(&self, other: &Range) -> bool {
        self.family == other.family && self.first <= other.last && other.first <= self.last
    }

    /// True when the ranges overlap or sit directly next to each other.
    pub fn touches(&self, other: &Range) -> bool {
        self.family == other.family
            && self.first <= other.last.saturating_add(1)
            && other.first <= self.last.saturating_add(1)
    }
}

impl From<CidrBlock> for Range {
    fn from(block: CidrBlock) -> Self {
        block.to_range()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first())
        } else {
            write!(f, "{}-{}", self.first(), self.last())
        }
    }
}

impl Serialize for Range {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}
