//! Line-oriented input normalization.
//!
//! Turns a batch of text lines (addresses, CIDR blocks, `start-end` ranges)
//! into typed ranges, keeping one result per non-blank line.

use crate::error::{ParseError, ParseReason};
use crate::models::{parse_address, parse_cidr, CidrBlock, Range};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Regex for `start - end` with exactly one dash and optional spaces.
static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_range_regex() -> &'static Regex {
    RANGE_REGEX.get_or_init(|| {
        Regex::new(r"^(?P<start>[^\s-]+)\s*-\s*(?P<end>[^\s-]+)$").expect("Invalid Regex")
    })
}

/// What to do with a CIDR block whose address has host bits set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HostBitsPolicy {
    /// Report the line as a [`ParseReason::HostBitsSet`] error.
    #[default]
    Reject,
    /// Replace the block by the network block that contains it.
    Snap,
}

/// Which syntax a line was written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum InputForm {
    Address,
    Cidr,
    Range,
}

/// A successfully parsed input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedItem {
    /// 1-based line number in the batch.
    pub line: usize,
    /// The original line, comments included.
    pub text: String,
    pub form: InputForm,
    pub range: Range,
}

/// Result of normalizing one line.
pub type ParsedInput = Result<ParsedItem, ParseError>;

/// One parser in the ordered attempt list.
///
/// `None` means the text is not in this syntax at all and the next attempt
/// should run. `Some` claims the line, successfully or not.
type Attempt = fn(&str, HostBitsPolicy) -> Option<Result<Range, ParseError>>;

const ATTEMPTS: [(InputForm, Attempt); 3] = [
    (InputForm::Address, try_address),
    (InputForm::Cidr, try_cidr),
    (InputForm::Range, try_range),
];

fn try_address(text: &str, _policy: HostBitsPolicy) -> Option<Result<Range, ParseError>> {
    if text.contains(['/', '-']) {
        return None;
    }
    Some(parse_address(text).map(Range::single))
}

fn try_cidr(text: &str, policy: HostBitsPolicy) -> Option<Result<Range, ParseError>> {
    if !text.contains('/') || text.contains('-') {
        return None;
    }
    let result = match parse_cidr(text) {
        Ok((address, prefix)) => Ok(CidrBlock::from_parts(
            address.family(),
            address.value(),
            prefix,
        )),
        Err(ParseError {
            reason: ParseReason::HostBitsSet { network, prefix },
            ..
        }) if policy == HostBitsPolicy::Snap => {
            log::debug!("snapping '{text}' to {network}/{prefix}");
            Ok(CidrBlock::from_parts(
                network.family(),
                network.value(),
                prefix,
            ))
        }
        Err(e) => Err(e),
    };
    Some(result.map(|block| block.to_range()))
}

fn try_range(text: &str, _policy: HostBitsPolicy) -> Option<Result<Range, ParseError>> {
    if !text.contains('-') {
        return None;
    }
    let Some(caps) = get_range_regex().captures(text) else {
        return Some(Err(ParseError::new(text, ParseReason::Unrecognized)));
    };
    Some(parse_range(text, &caps["start"], &caps["end"]))
}

fn parse_range(text: &str, start: &str, end: &str) -> Result<Range, ParseError> {
    let invalid = |reason: ParseReason| ParseError::new(text, reason);
    let start = parse_address(start).map_err(|_| invalid(ParseReason::InvalidAddress))?;
    let end = parse_address(end).map_err(|_| invalid(ParseReason::InvalidAddress))?;
    if start.family() != end.family() {
        return Err(invalid(ParseReason::FamilyMismatch {
            start: start.family(),
            end: end.family(),
        }));
    }
    if start > end {
        return Err(invalid(ParseReason::ReversedRange));
    }
    Range::new(start, end).map_err(|_| invalid(ParseReason::ReversedRange))
}

/// Strip a trailing `#` comment and surrounding whitespace.
fn strip_line(line: &str) -> &str {
    line.split_once('#').map_or(line, |(head, _)| head).trim()
}

/// Parse a single item of text, without line context.
///
/// # Returns
/// * `Ok((form, range))` - The syntax that matched and the resulting range
/// * `Err(ParseError)` - Why the text is not a valid item
pub fn parse_item(text: &str, policy: HostBitsPolicy) -> Result<(InputForm, Range), ParseError> {
    let text = strip_line(text);
    ATTEMPTS
        .iter()
        .find_map(|(form, attempt)| attempt(text, policy).map(|r| r.map(|range| (*form, range))))
        .unwrap_or_else(|| Err(ParseError::new(text, ParseReason::Unrecognized)))
}

/// Normalize a batch of lines.
///
/// Blank and comment-only lines are skipped but still counted, so every
/// result carries the 1-based line number it came from. Invalid lines are
/// reported in place and never abort the batch.
///
/// # Arguments
/// * `lines` - The input lines
/// * `policy` - How to treat CIDR blocks with host bits set
///
/// # Returns
/// One [`ParsedInput`] per non-blank line, in input order
pub fn normalize<'a, I>(lines: I, policy: HostBitsPolicy) -> Vec<ParsedInput>
where
    I: IntoIterator<Item = &'a str>,
{
    let inputs: Vec<ParsedInput> = lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| !strip_line(line).is_empty())
        .map(|(idx, line)| {
            let line_no = idx + 1;
            parse_item(line, policy)
                .map(|(form, range)| ParsedItem {
                    line: line_no,
                    text: line.to_string(),
                    form,
                    range,
                })
                .map_err(|e| e.at_line(line_no, line))
        })
        .collect();

    let errors = inputs.iter().filter(|i| i.is_err()).count();
    log::debug!(
        "normalized {} line(s), {} error(s)",
        inputs.len(),
        errors
    );
    inputs
}

/// Normalize a block of newline-separated text.
pub fn normalize_text(text: &str, policy: HostBitsPolicy) -> Vec<ParsedInput> {
    normalize(text.lines(), policy)
}

/// Split results into parsed items and errors, keeping order in each.
pub fn partition(inputs: &[ParsedInput]) -> (Vec<&ParsedItem>, Vec<&ParseError>) {
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for input in inputs {
        match input {
            Ok(item) => items.push(item),
            Err(e) => errors.push(e),
        }
    }
    (items, errors)
}
