//! CIDR block with a network base address and prefix length.

use super::address::{host_mask, network_of, parse_cidr, Address, AddressFamily};
use super::Range;
use crate::error::{Error, ParseError, PrefixError};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A CIDR block such as `10.0.0.0/24` or `2001:db8::/32`.
///
/// The base is always the network address: host bits are zero.
/// Ordering is by family, then base address, then prefix length, so a
/// supernet sorts directly before its first child.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CidrBlock {
    family: AddressFamily,
    base: u128,
    prefix: u8,
}

impl CidrBlock {
    /// Create a block, requiring `address` to be the network address.
    ///
    /// # Returns
    /// * `Err(PrefixError::OutOfRange)` - The prefix is longer than the family width
    /// * `Err(PrefixError::HostBitsSet)` - `address` is not the network address
    pub fn new(address: Address, prefix: u8) -> Result<CidrBlock, Error> {
        let family = address.family();
        let network = network_of(family, address.value(), prefix)?;
        if network != address.value() {
            return Err(PrefixError::HostBitsSet { address, prefix }.into());
        }
        Ok(CidrBlock {
            family,
            base: network,
            prefix,
        })
    }

    /// Create the block of length `prefix` that contains `address`.
    pub fn containing(address: Address, prefix: u8) -> Result<CidrBlock, Error> {
        let family = address.family();
        let base = network_of(family, address.value(), prefix)?;
        Ok(CidrBlock {
            family,
            base,
            prefix,
        })
    }

    /// Build a block from parts already known to be valid.
    pub(crate) fn from_parts(family: AddressFamily, base: u128, prefix: u8) -> CidrBlock {
        debug_assert!(prefix <= family.bits(), "prefix /{prefix} too long");
        debug_assert!(
            host_mask(family, prefix).map_or(false, |m| base & m == 0),
            "host bits set in base"
        );
        CidrBlock {
            family,
            base,
            prefix,
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of host bits (`width - prefix`).
    pub fn host_bits(&self) -> u8 {
        self.family.bits() - self.prefix
    }

    /// The network address, identical to [`CidrBlock::first`].
    pub fn network(&self) -> Address {
        Address::from_parts(self.family, self.base)
    }

    pub fn first(&self) -> Address {
        self.network()
    }

    pub fn last(&self) -> Address {
        Address::from_parts(self.family, self.last_value())
    }

    /// The all-ones host address. For IPv6 this is simply the last address.
    pub fn broadcast(&self) -> Address {
        self.last()
    }

    pub(crate) fn first_value(&self) -> u128 {
        self.base
    }

    pub(crate) fn last_value(&self) -> u128 {
        self.base | self.host_mask_value()
    }

    fn host_mask_value(&self) -> u128 {
        let host_bits = self.host_bits();
        if host_bits == 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        }
    }

    /// Total number of addresses, `None` only for `::/0` (2^128 does not fit).
    pub fn address_count(&self) -> Option<u128> {
        self.host_mask_value().checked_add(1)
    }

    /// First address usable by a host.
    ///
    /// IPv4 blocks of /30 and larger skip the network address; /31 and /32
    /// use every address (RFC 3021). IPv6 has no broadcast and uses every address.
    pub fn first_usable(&self) -> Address {
        if self.reserves_network_and_broadcast() {
            Address::from_parts(self.family, self.base + 1)
        } else {
            self.first()
        }
    }

    /// Last address usable by a host, see [`CidrBlock::first_usable`].
    pub fn last_usable(&self) -> Address {
        if self.reserves_network_and_broadcast() {
            Address::from_parts(self.family, self.last_value() - 1)
        } else {
            self.last()
        }
    }

    /// Number of host-usable addresses, `None` only for `::/0`.
    pub fn usable_count(&self) -> Option<u128> {
        let count = self.address_count()?;
        if self.reserves_network_and_broadcast() {
            Some(count - 2)
        } else {
            Some(count)
        }
    }

    fn reserves_network_and_broadcast(&self) -> bool {
        self.family == AddressFamily::V4 && self.host_bits() >= 2
    }

    /// The block one prefix shorter that contains this one.
    pub fn parent(&self) -> Option<CidrBlock> {
        if self.prefix == 0 {
            return None;
        }
        let prefix = self.prefix - 1;
        let base = network_of(self.family, self.base, prefix).ok()?;
        Some(CidrBlock::from_parts(self.family, base, prefix))
    }

    /// The block of equal size sharing this block's parent.
    pub fn sibling(&self) -> Option<CidrBlock> {
        if self.prefix == 0 {
            return None;
        }
        let bit = 1u128 << self.host_bits();
        Some(CidrBlock::from_parts(
            self.family,
            self.base ^ bit,
            self.prefix,
        ))
    }

    pub fn contains_address(&self, address: &Address) -> bool {
        address.family() == self.family
            && self.base <= address.value()
            && address.value() <= self.last_value()
    }

    pub fn contains_block(&self, other: &CidrBlock) -> bool {
        other.family == self.family
            && self.prefix <= other.prefix
            && self.base <= other.base
            && other.last_value() <= self.last_value()
    }

    pub fn to_range(&self) -> Range {
        Range::from_parts(self.family, self.base, self.last_value())
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

impl FromStr for CidrBlock {
    type Err = ParseError;

    /// Strict parse: host bits set is an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, prefix) = parse_cidr(s)?;
        Ok(CidrBlock::from_parts(
            address.family(),
            address.value(),
            prefix,
        ))
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<CidrBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CidrBlock::from_str(&s)
            .map_err(|e| de::Error::custom(format!("invalid CIDR block: {e}")))
    }
}
