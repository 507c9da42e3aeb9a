//! Summarization of parsed input into per-family CIDR lists.
//!
//! Pipeline per family: merge → exact decomposition → optional cover coalescing.

use super::merge::{merge, merge_family};
use super::normalize::{partition, ParsedInput};
use crate::error::{Error, ParseError};
use crate::models::{AddressFamily, CidrBlock, Range};
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SummarizePolicy {
    /// Output covers exactly the input addresses.
    #[default]
    Exact,
    /// Output may cover extra addresses to use fewer blocks.
    #[value(name = "cover", alias = "minimal-cover")]
    #[serde(rename = "cover")]
    MinimalCover,
}

/// Per-family summarization result plus every rejected input line.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub v4: Vec<CidrBlock>,
    pub v6: Vec<CidrBlock>,
    pub errors: Vec<ParseError>,
}

impl Summary {
    pub fn blocks(&self, family: AddressFamily) -> &[CidrBlock] {
        match family {
            AddressFamily::V4 => &self.v4,
            AddressFamily::V6 => &self.v6,
        }
    }

    /// All blocks, IPv4 first.
    pub fn all_blocks(&self) -> impl Iterator<Item = &CidrBlock> {
        self.v4.iter().chain(self.v6.iter())
    }
}

/// Summarize a normalized batch.
///
/// IPv4 and IPv6 are summarized independently. Parse errors are carried
/// through to [`Summary::errors`] and never stop the valid lines from being
/// summarized.
///
/// # Arguments
/// * `inputs` - Output of [`super::normalize`]
/// * `policy` - [`SummarizePolicy::Exact`] or [`SummarizePolicy::MinimalCover`]
pub fn summarize(inputs: &[ParsedInput], policy: SummarizePolicy) -> Summary {
    let (items, errors) = partition(inputs);
    let (v4, v6): (Vec<Range>, Vec<Range>) = items
        .iter()
        .map(|item| item.range)
        .partition(|r| r.family() == AddressFamily::V4);

    let summary = Summary {
        v4: summarize_family(AddressFamily::V4, v4, policy),
        v6: summarize_family(AddressFamily::V6, v6, policy),
        errors: errors.into_iter().cloned().collect(),
    };
    log::info!(
        "summarized {} item(s) into {} IPv4 and {} IPv6 block(s), {} error(s), policy {:?}",
        items.len(),
        summary.v4.len(),
        summary.v6.len(),
        summary.errors.len(),
        policy
    );
    summary
}

/// Summarize ranges of a single family.
///
/// # Returns
/// * `Err(Error::FamilyMismatch)` - The ranges mix IPv4 and IPv6
pub fn summarize_ranges(ranges: &[Range], policy: SummarizePolicy) -> Result<Vec<CidrBlock>, Error> {
    let merged = merge(ranges)?;
    Ok(apply_policy(merged.to_cidrs(), policy))
}

fn summarize_family(family: AddressFamily, ranges: Vec<Range>, policy: SummarizePolicy) -> Vec<CidrBlock> {
    if ranges.is_empty() {
        return Vec::new();
    }
    apply_policy(merge_family(family, ranges).to_cidrs(), policy)
}

fn apply_policy(exact: Vec<CidrBlock>, policy: SummarizePolicy) -> Vec<CidrBlock> {
    match policy {
        SummarizePolicy::Exact => exact,
        SummarizePolicy::MinimalCover => coalesce_cover(exact),
    }
}

/// Coalesce an exact decomposition into a cover with fewer blocks.
///
/// Two neighbouring blocks are replaced by the immediate parent of one of
/// them when that parent also contains the other; any block already inside
/// the parent is absorbed. Repeats until no neighbouring pair qualifies.
/// Coverage only ever grows.
///
/// `blocks` must be sorted and pairwise disjoint, as produced by the exact
/// decomposition of a merged set.
fn coalesce_cover(blocks: Vec<CidrBlock>) -> Vec<CidrBlock> {
    let input_len = blocks.len();
    let mut out: Vec<CidrBlock> = Vec::with_capacity(input_len);

    for block in blocks {
        out.push(block);
        while out.len() >= 2 {
            let b = out[out.len() - 1];
            let a = out[out.len() - 2];
            if a.contains_block(&b) {
                out.pop();
                break;
            }
            let Some(parent) = cover_parent(&a, &b) else {
                break;
            };
            log::trace!("cover: {a} + {b} -> {parent}");
            out.truncate(out.len() - 2);
            while out.last().is_some_and(|prev| parent.contains_block(prev)) {
                out.pop();
            }
            out.push(parent);
        }
    }

    log::debug!("minimal cover reduced {input_len} block(s) to {}", out.len());
    out
}

/// The smaller immediate parent of `a` or `b` that contains both, if any.
fn cover_parent(a: &CidrBlock, b: &CidrBlock) -> Option<CidrBlock> {
    [a.parent(), b.parent()]
        .into_iter()
        .flatten()
        .filter(|p| p.contains_block(a) && p.contains_block(b))
        .max_by_key(|p| p.prefix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalize::{normalize, HostBitsPolicy};
    use pretty_assertions::assert_eq;

    fn run(lines: &[&str], policy: SummarizePolicy) -> Summary {
        let inputs = normalize(lines.iter().copied(), HostBitsPolicy::Reject);
        summarize(&inputs, policy)
    }

    fn strings(blocks: &[CidrBlock]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_exact_non_siblings_stay_apart() {
        let summary = run(&["192.168.1.0/24", "192.168.2.0/24"], SummarizePolicy::Exact);
        assert_eq!(strings(&summary.v4), vec!["192.168.1.0/24", "192.168.2.0/24"]);
        assert!(summary.v6.is_empty());
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_exact_sibling_halves_merge() {
        let summary = run(&["10.0.0.0/25", "10.0.0.128/25"], SummarizePolicy::Exact);
        assert_eq!(strings(&summary.v4), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_exact_mixed_families_and_errors() {
        let summary = run(
            &["10.0.0.0/25", "2001:db8::/33", "bad", "10.0.0.128-10.0.0.255", "2001:db8:8000::/33"],
            SummarizePolicy::Exact,
        );
        assert_eq!(strings(&summary.v4), vec!["10.0.0.0/24"]);
        assert_eq!(strings(&summary.v6), vec!["2001:db8::/32"]);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].line, Some(3));
        assert_eq!(summary.all_blocks().count(), 2);
    }

    #[test]
    fn test_cover_keeps_non_siblings_apart() {
        let summary = run(&["192.168.1.0/24", "192.168.2.0/24"], SummarizePolicy::MinimalCover);
        assert_eq!(strings(&summary.v4), vec!["192.168.1.0/24", "192.168.2.0/24"]);
    }

    #[test]
    fn test_cover_promotes_partial_sibling() {
        let summary = run(&["10.0.0.0/25", "10.0.0.128/26"], SummarizePolicy::MinimalCover);
        assert_eq!(strings(&summary.v4), vec!["10.0.0.0/24"]);

        let exact = run(&["10.0.0.0/25", "10.0.0.128/26"], SummarizePolicy::Exact);
        assert_eq!(strings(&exact.v4), vec!["10.0.0.0/25", "10.0.0.128/26"]);
    }

    #[test]
    fn test_cover_chains_upwards() {
        // 10.0.0.0/24 + 10.0.1.0/25 -> 10.0.0.0/23, whose parent 10.0.0.0/22 holds 10.0.2.0/26
        let summary = run(
            &["10.0.0.0/24", "10.0.1.0/25", "10.0.2.0/26"],
            SummarizePolicy::MinimalCover,
        );
        assert_eq!(strings(&summary.v4), vec!["10.0.0.0/22"]);
    }

    #[test]
    fn test_cover_order_independent() {
        let lines = ["10.0.0.5", "10.0.0.0/30", "10.0.0.16/28", "10.0.1.0/24", "10.0.0.200"];
        let forward = run(&lines, SummarizePolicy::MinimalCover);
        let mut reversed = lines;
        reversed.reverse();
        let backward = run(&reversed, SummarizePolicy::MinimalCover);
        assert_eq!(forward.v4, backward.v4);
    }

    #[test]
    fn test_coalesce_cover_absorbs_contained() {
        let blocks: Vec<CidrBlock> = ["10.0.0.0/26", "10.0.0.64/27", "10.0.0.128/25"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        // parent(/27 at .64) = .64/26 holds only itself; parent(.0/26) = .0/25 holds .64/27
        let covered = coalesce_cover(blocks);
        assert_eq!(strings(&covered), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_summarize_ranges() {
        let ranges: Vec<Range> = ["10.0.0.0/25", "10.0.0.128/25"]
            .iter()
            .map(|s| s.parse::<CidrBlock>().unwrap().to_range())
            .collect();
        let blocks = summarize_ranges(&ranges, SummarizePolicy::Exact).unwrap();
        assert_eq!(strings(&blocks), vec!["10.0.0.0/24"]);

        let mixed = vec![ranges[0], "::/1".parse::<CidrBlock>().unwrap().to_range()];
        assert!(matches!(
            summarize_ranges(&mixed, SummarizePolicy::Exact),
            Err(Error::FamilyMismatch { .. })
        ));
    }
}
