//! Address-space algebra.
//!
//! This module contains the operations over parsed address data:
//! - [`normalize`] - Parsing a batch of lines into typed ranges
//! - [`merge`] - Fusing ranges into a canonical [`MergedSet`]
//! - [`decompose`] - Covering a range with the fewest CIDR blocks
//! - [`summarize`] - The full normalize, merge, decompose pipeline
//! - [`split_by_count`] / [`split_by_prefix`] - Equal-sized child blocks of a parent block
//! - [`difference`], [`intersection`], [`containment`] - Set algebra between two sets

mod decompose;
mod merge;
mod normalize;
mod set_ops;
mod split;
mod summarize;

// Re-export public functions
pub use decompose::{decompose, decompose_all};
pub use merge::{merge, MergedSet};
pub use normalize::{
    normalize, normalize_text, parse_item, partition, HostBitsPolicy, InputForm, ParsedInput,
    ParsedItem,
};
pub use set_ops::{
    containment, difference, difference_cidrs, intersection, intersection_cidrs, Containment,
    ContainmentStatus,
};
pub use split::{split_by_count, split_by_prefix, Subnets};
pub use summarize::{summarize, summarize_ranges, Summary, SummarizePolicy};
