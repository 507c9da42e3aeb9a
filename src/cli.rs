//! Subcommand execution for the `cidr-algebra` binary.
//!
//! Reads input files, runs the requested operation and renders the result.
//! Kept out of `main.rs` so it can be tested.

use crate::config::{Command, Config};
use crate::error::{Error, ParseError, ParseReason};
use crate::models::{CidrBlock, Range};
use crate::output::{render_blocks, render_containment};
use crate::processing::{
    containment, difference_cidrs, intersection_cidrs, merge, normalize_text, partition,
    split_by_count, split_by_prefix, summarize, HostBitsPolicy, MergedSet, ParsedInput,
};
use std::error::Error as StdError;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Largest split the binary will render.
pub const MAX_PRINTED_CHILDREN: usize = 1 << 16;

/// Rendered output plus the input lines that were rejected along the way.
#[derive(Debug, Default)]
pub struct Report {
    pub output: String,
    /// Rejected lines, tagged with the input they came from.
    pub parse_errors: Vec<(String, ParseError)>,
}

/// A parsed input file: the merged set and the original items.
struct LoadedSet {
    merged: MergedSet,
    items: Vec<Range>,
}

/// Execute the configured subcommand.
///
/// # Returns
/// * `Ok(Report)` - The rendered result, possibly with rejected input lines
/// * `Err` - Unreadable input, or a structural error such as mixed families
pub fn run(config: &Config) -> Result<Report, Box<dyn StdError>> {
    let mut report = Report::default();
    let format = config.format;
    let policy = config.host_bits;

    let output = match &config.cmd {
        Command::Summarize { policy: summary_policy, files } => {
            let sources = if files.is_empty() {
                vec![PathBuf::from("-")]
            } else {
                files.clone()
            };
            let mut inputs: Vec<ParsedInput> = Vec::new();
            let mut names = Vec::new();
            for source in &sources {
                let parsed = normalize_text(&read_source(source)?, policy);
                names.extend(parsed.iter().map(|_| source.display().to_string()));
                inputs.extend(parsed);
            }
            let summary = summarize(&inputs, *summary_policy);
            // summary errors keep input order, so pair each with the file it came from
            let error_sources = inputs
                .iter()
                .zip(names)
                .filter_map(|(input, name)| input.is_err().then_some(name));
            report
                .parse_errors
                .extend(error_sources.zip(summary.errors.iter().cloned()));
            let blocks: Vec<CidrBlock> = summary.all_blocks().copied().collect();
            render_blocks(format, &blocks)?
        }
        Command::Split {
            cidr,
            count,
            prefix,
        } => {
            let parent = parse_block(cidr, policy)?;
            let children = match (count, prefix) {
                (Some(count), _) => split_by_count(&parent, *count)?,
                (None, Some(prefix)) => split_by_prefix(&parent, *prefix)?,
                (None, None) => return Err("split needs --count or --prefix".into()),
            };
            match children.remaining() {
                Some(n) if n <= MAX_PRINTED_CHILDREN as u128 => {}
                n => {
                    let n = n.map_or_else(|| "2^128".to_string(), |n| n.to_string());
                    return Err(format!(
                        "split of {parent} gives {n} blocks, at most {MAX_PRINTED_CHILDREN} are printed"
                    )
                    .into());
                }
            }
            render_blocks(format, &children.collect::<Vec<_>>())?
        }
        Command::Diff { a, b } => {
            let (a, b) = (report.load(a, policy)?, report.load(b, policy)?);
            render_blocks(format, &difference_cidrs(&a.merged, &b.merged)?)?
        }
        Command::Intersect { a, b } => {
            let (a, b) = (report.load(a, policy)?, report.load(b, policy)?);
            render_blocks(format, &intersection_cidrs(&a.merged, &b.merged)?)?
        }
        Command::Contains { a, b } => {
            let (a, b) = (report.load(a, policy)?, report.load(b, policy)?);
            render_containment(format, &containment(&a.merged, &b.items)?)?
        }
    };
    report.output = output;

    if !report.parse_errors.is_empty() {
        log::warn!("{} input line(s) rejected", report.parse_errors.len());
    }
    Ok(report)
}

impl Report {
    fn collect_errors(&mut self, source: &Path, inputs: &[ParsedInput]) {
        let (_, errors) = partition(inputs);
        let name = source.display().to_string();
        self.parse_errors
            .extend(errors.into_iter().map(|e| (name.clone(), e.clone())));
    }

    fn load(&mut self, source: &Path, policy: HostBitsPolicy) -> Result<LoadedSet, Box<dyn StdError>> {
        let parsed = normalize_text(&read_source(source)?, policy);
        self.collect_errors(source, &parsed);
        let (items, _) = partition(&parsed);
        let items: Vec<Range> = items.iter().map(|item| item.range).collect();
        let merged = merge(&items)?;
        log::debug!(
            "loaded {} item(s) from {} into {} range(s)",
            items.len(),
            source.display(),
            merged.len()
        );
        Ok(LoadedSet { merged, items })
    }
}

/// Parse a CIDR argument, applying the host-bits policy.
pub fn parse_block(text: &str, policy: HostBitsPolicy) -> Result<CidrBlock, Error> {
    match text.trim().parse::<CidrBlock>() {
        Ok(block) => Ok(block),
        Err(ParseError {
            reason: ParseReason::HostBitsSet { network, prefix },
            ..
        }) if policy == HostBitsPolicy::Snap => CidrBlock::new(network, prefix),
        Err(e) => Err(e.into()),
    }
}

/// Read a whole input file, `-` meaning stdin.
fn read_source(path: &Path) -> Result<String, Box<dyn StdError>> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading input file {}: {e}", path.display()).into())
}
