//! Address-space algebra for IPv4 and IPv6.
//!
//! Parses addresses, CIDR blocks and ranges, then merges, summarizes, splits
//! and compares them as sets of addresses.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;

pub use error::{Error, ParseError, ParseReason, PrefixError};
pub use models::{Address, AddressFamily, CidrBlock, Range};
pub use processing::{
    containment, decompose, difference, intersection, merge, normalize, split_by_count,
    split_by_prefix, summarize, summarize_ranges, MergedSet, SummarizePolicy,
};
