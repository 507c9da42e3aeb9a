//! Address-space value types.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Address`] and [`AddressFamily`] - A single IPv4 or IPv6 address
//! - [`CidrBlock`] - A network address with a prefix length
//! - [`Range`] - An inclusive address range

mod address;
mod cidr;
mod range;

// Re-export public types
pub use address::{
    alignment, host_mask, network_of, parse_address, parse_cidr, prefix_mask, Address,
    AddressFamily, MAX_LENGTH_V4, MAX_LENGTH_V6,
};
pub use cidr::CidrBlock;
pub use range::Range;
