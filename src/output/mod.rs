//! Output formatting for computed results.
//!
//! This module turns library results into text for the binary:
//! - [`csv`] - Quoted, aligned CSV rows
//! - [`terminal`] - Field and error-line formatting helpers
//!
//! The library operations never call into this module.

mod csv;
mod terminal;

pub use csv::{block_rows, blocks_csv, containment_csv, BlockPrintRow};
pub use terminal::{format_field, format_parse_error};

use crate::models::CidrBlock;
use crate::processing::Containment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Render a block list in the requested format.
pub fn render_blocks(format: OutputFormat, blocks: &[CidrBlock]) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Csv => Ok(blocks_csv(blocks).join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(&block_rows(blocks)),
    }
}

/// Render a containment report in the requested format.
pub fn render_containment(
    format: OutputFormat,
    report: &[Containment],
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Csv => Ok(containment_csv(report).join("\n")),
        OutputFormat::Json => serde_json::to_string_pretty(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_blocks_json() {
        let blocks: Vec<CidrBlock> = vec!["10.0.0.0/30".parse().unwrap()];
        let json = render_blocks(OutputFormat::Json, &blocks).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["cidr"], "10.0.0.0/30");
        assert_eq!(value[0]["first_usable"], "10.0.0.1");
        assert_eq!(value[0]["last_usable"], "10.0.0.2");
        assert_eq!(value[0]["addresses"], "4");
        assert_eq!(value[0]["family"], "IPv4");
    }

    #[test]
    fn test_render_blocks_csv() {
        let csv = render_blocks(OutputFormat::Csv, &[]).unwrap();
        assert_eq!(csv.lines().count(), 1, "header only");
    }
}
