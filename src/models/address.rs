//! IP address model shared by both address families.
//!
//! Every address is stored as a `u128` magnitude tagged with its
//! [`AddressFamily`], so the arithmetic is written once and width-dependent
//! steps ask the family for its bit width.

use crate::error::{Error, ParseError, ParseReason, PrefixError};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum prefix length of an IPv4 block (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length of an IPv6 block (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl AddressFamily {
    /// Address width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            AddressFamily::V4 => MAX_LENGTH_V4,
            AddressFamily::V6 => MAX_LENGTH_V6,
        }
    }

    /// The highest address of the family as a magnitude.
    pub const fn max_value(self) -> u128 {
        match self {
            AddressFamily::V4 => u32::MAX as u128,
            AddressFamily::V6 => u128::MAX,
        }
    }

    /// Fail with [`Error::FamilyMismatch`] unless `other` is the same family.
    pub fn ensure(self, other: AddressFamily) -> Result<(), Error> {
        if self == other {
            Ok(())
        } else {
            Err(Error::FamilyMismatch {
                expected: self,
                found: other,
            })
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Network mask for `prefix` within the family width.
///
/// # Examples
/// ```
/// use cidr_algebra::models::{prefix_mask, AddressFamily};
/// assert_eq!(prefix_mask(AddressFamily::V4, 24).unwrap(), 0xFFFF_FF00);
/// ```
pub fn prefix_mask(family: AddressFamily, prefix: u8) -> Result<u128, PrefixError> {
    Ok(family.max_value() & !host_mask(family, prefix)?)
}

/// Mask of the host bits left over by `prefix`.
pub fn host_mask(family: AddressFamily, prefix: u8) -> Result<u128, PrefixError> {
    let width = family.bits();
    if prefix > width {
        return Err(PrefixError::OutOfRange {
            family,
            prefix: prefix as u16,
        });
    }
    let host_bits = width - prefix;
    if host_bits == 128 {
        Ok(u128::MAX)
    } else {
        Ok((1u128 << host_bits) - 1)
    }
}

/// Clear the host bits of `value`, giving the network address for `prefix`.
pub fn network_of(family: AddressFamily, value: u128, prefix: u8) -> Result<u128, PrefixError> {
    Ok(value & !host_mask(family, prefix)?)
}

/// Number of host bits a block starting at `value` may have.
///
/// This is the count of trailing zero bits, capped at the family width, so
/// address zero is aligned to the whole address space.
pub fn alignment(family: AddressFamily, value: u128) -> u8 {
    let width = family.bits();
    if value == 0 {
        width
    } else {
        (value.trailing_zeros() as u8).min(width)
    }
}

/// An IPv4 or IPv6 address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address {
    family: AddressFamily,
    value: u128,
}

impl Address {
    pub(crate) const fn from_parts(family: AddressFamily, value: u128) -> Address {
        Address { family, value }
    }

    pub fn v4(addr: Ipv4Addr) -> Address {
        Address {
            family: AddressFamily::V4,
            value: u32::from(addr) as u128,
        }
    }

    pub fn v6(addr: Ipv6Addr) -> Address {
        Address {
            family: AddressFamily::V6,
            value: u128::from(addr),
        }
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn value(&self) -> u128 {
        self.value
    }

    pub fn to_ip_addr(&self) -> IpAddr {
        match self.family {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from(self.value as u32)),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(self.value)),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Address::v4(v4),
            IpAddr::V6(v6) => Address::v6(v6),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_ip_addr())
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_address(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_address(&s).map_err(de::Error::custom)
    }
}

/// Parse a single IPv4 or IPv6 address.
///
/// The text must be exactly an address: surrounding whitespace, zone ids and
/// trailing garbage are rejected. IPv4 octets with leading zeros
/// (`192.168.01.1`) are rejected rather than read as decimal or octal.
/// IPv4-mapped IPv6 addresses (`::ffff:10.0.0.1`) stay in the IPv6 family.
pub fn parse_address(text: &str) -> Result<Address, ParseError> {
    if text.contains(':') {
        Ipv6Addr::from_str(text)
            .map(Address::v6)
            .map_err(|_| ParseError::new(text, ParseReason::InvalidAddress))
    } else {
        Ipv4Addr::from_str(text)
            .map(Address::v4)
            .map_err(|_| ParseError::new(text, ParseReason::InvalidAddress))
    }
}

/// Parse `address/prefix` into its address and prefix length.
///
/// # Returns
/// * `Ok((address, prefix))` - The address is already the network address
/// * `Err` with [`ParseReason::HostBitsSet`] - The address has host bits set;
///   the reason carries the network address so callers may snap to it
pub fn parse_cidr(text: &str) -> Result<(Address, u8), ParseError> {
    let (addr_part, prefix_part) = text
        .split_once('/')
        .ok_or_else(|| ParseError::new(text, ParseReason::InvalidPrefix))?;
    let address =
        parse_address(addr_part).map_err(|_| ParseError::new(text, ParseReason::InvalidAddress))?;

    // u8::from_str accepts a leading '+', prefixes are plain digits only
    if prefix_part.is_empty() || !prefix_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(text, ParseReason::InvalidPrefix));
    }
    let prefix: u8 = prefix_part
        .parse()
        .map_err(|_| ParseError::new(text, ParseReason::InvalidPrefix))?;

    let family = address.family();
    let network = network_of(family, address.value(), prefix)
        .map_err(|_| ParseError::new(text, ParseReason::InvalidPrefix))?;
    if network != address.value() {
        return Err(ParseError::new(
            text,
            ParseReason::HostBitsSet {
                network: Address::from_parts(family, network),
                prefix,
            },
        ));
    }
    Ok((address, prefix))
}
