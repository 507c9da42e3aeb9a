//! CSV output formatting for blocks and containment reports.

use super::terminal::format_field;
use crate::models::{AddressFamily, CidrBlock};
use crate::processing::{Containment, ContainmentStatus};
use serde::Serialize;

/// Represents one CIDR block prepared for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockPrintRow {
    /// Row index, 1-based.
    pub j: usize,
    pub family: AddressFamily,
    /// Block in `network/prefix` notation.
    pub cidr: String,
    pub first_usable: String,
    pub last_usable: String,
    /// Total addresses as decimal text, `2^128` for the whole IPv6 space.
    pub addresses: String,
}

impl BlockPrintRow {
    pub fn new(j: usize, block: &CidrBlock) -> BlockPrintRow {
        BlockPrintRow {
            j,
            family: block.family(),
            cidr: block.to_string(),
            first_usable: block.first_usable().to_string(),
            last_usable: block.last_usable().to_string(),
            addresses: format_count(block.address_count()),
        }
    }
}

/// Build numbered rows for a list of blocks.
pub fn block_rows(blocks: &[CidrBlock]) -> Vec<BlockPrintRow> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, b)| BlockPrintRow::new(i + 1, b))
        .collect()
}

/// Render blocks as a header line followed by one line per block.
pub fn blocks_csv(blocks: &[CidrBlock]) -> Vec<String> {
    let mut lines = vec![r#" "cnt", "family",                 "cidr",         "first_usable",          "last_usable",  "addresses""#.to_string()];
    lines.extend(block_rows(blocks).iter().map(csv_block_row));
    lines
}

/// Render a single block row.
fn csv_block_row(row: &BlockPrintRow) -> String {
    format!(
        r#"{j},{family},{cidr},{first},{last},{addresses}"#,
        j = format_field(row.j, 6),
        family = format_field(row.family, 8),
        cidr = format_field(&row.cidr, 22),
        first = format_field(&row.first_usable, 22),
        last = format_field(&row.last_usable, 22),
        addresses = format_field(&row.addresses, 12),
    )
}

/// Render a containment report, one line per original item.
pub fn containment_csv(report: &[Containment]) -> Vec<String> {
    let mut lines = vec![r#" "cnt",                              "item",          "status",  "covered""#.to_string()];
    lines.extend(report.iter().enumerate().map(|(i, c)| {
        format!(
            r#"{j},{item},{status},{covered}"#,
            j = format_field(i + 1, 6),
            item = format_field(c.item, 36),
            status = format_field(status_label(c.status), 16),
            covered = format_field(format_count(c.covered), 10),
        )
    }));
    lines
}

fn status_label(status: ContainmentStatus) -> &'static str {
    match status {
        ContainmentStatus::FullyContained => "contained",
        ContainmentStatus::PartiallyOverlapping => "partial",
        ContainmentStatus::Disjoint => "disjoint",
    }
}

fn format_count(count: Option<u128>) -> String {
    count.map_or_else(|| "2^128".to_string(), |c| c.to_string())
}
