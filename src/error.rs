//! Error types for address parsing and set operations.
//!
//! Line-level problems are reported as [`ParseError`] and collected per batch.
//! Structural problems (mixed families, bad prefixes, impossible splits) are
//! reported as [`Error`] and abort only the operation that hit them.

use crate::models::{Address, AddressFamily, CidrBlock};
use serde::Serialize;
use thiserror::Error;

/// Why a single line of input could not be turned into a range.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseReason {
    #[error("invalid IP address")]
    InvalidAddress,

    #[error("invalid prefix length")]
    InvalidPrefix,

    #[error("host bits set, network address is {network}/{prefix}")]
    HostBitsSet { network: Address, prefix: u8 },

    #[error("range mixes {start} and {end} addresses")]
    FamilyMismatch {
        start: AddressFamily,
        end: AddressFamily,
    },

    #[error("range start is greater than range end")]
    ReversedRange,

    #[error("not an address, CIDR block or range")]
    Unrecognized,
}

/// A rejected input line, with enough context to point the user at it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}'{input}': {reason}", line_prefix(.line))]
pub struct ParseError {
    /// 1-based line number within the batch, `None` for standalone parsing.
    pub line: Option<usize>,
    /// The offending text as it was handed to the parser.
    pub input: String,
    pub reason: ParseReason,
}

impl ParseError {
    pub fn new(input: &str, reason: ParseReason) -> ParseError {
        ParseError {
            line: None,
            input: input.to_string(),
            reason,
        }
    }

    /// Attach a batch line number and the full original line.
    pub fn at_line(mut self, line: usize, text: &str) -> ParseError {
        self.line = Some(line);
        self.input = text.to_string();
        self
    }
}

fn line_prefix(line: &Option<usize>) -> String {
    line.map(|l| format!("line {l}: ")).unwrap_or_default()
}

/// Invalid prefix lengths, including network addresses with host bits set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("prefix /{prefix} is out of range for {family}")]
    OutOfRange { family: AddressFamily, prefix: u16 },

    #[error("{address}/{prefix} has host bits set")]
    HostBitsSet { address: Address, prefix: u8 },

    #[error("child prefix /{child} must be longer than parent {parent}")]
    NotLongerThanParent { parent: CidrBlock, child: u16 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("address family mismatch: expected {expected}, found {found}")]
    FamilyMismatch {
        expected: AddressFamily,
        found: AddressFamily,
    },

    #[error(transparent)]
    InvalidPrefix(#[from] PrefixError),

    #[error("invalid range: {first} is greater than {last}")]
    InvalidRange { first: Address, last: Address },

    #[error("split count must be at least 1")]
    InvalidSplitCount,

    #[error("cannot split {parent} into /{child_prefix} blocks")]
    UnrepresentableSplit { parent: CidrBlock, child_prefix: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new("10.0.0.300", ParseReason::InvalidAddress);
        assert_eq!(err.to_string(), "'10.0.0.300': invalid IP address");

        let err = err.at_line(7, "  10.0.0.300  ");
        assert_eq!(err.line, Some(7));
        assert_eq!(err.to_string(), "line 7: '  10.0.0.300  ': invalid IP address");
    }

    #[test]
    fn test_error_from_parse_error() {
        let err: Error = ParseError::new("x", ParseReason::Unrecognized).into();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.to_string(), "'x': not an address, CIDR block or range");
    }

    #[test]
    fn test_family_mismatch_display() {
        let err = Error::FamilyMismatch {
            expected: AddressFamily::V4,
            found: AddressFamily::V6,
        };
        assert_eq!(
            err.to_string(),
            "address family mismatch: expected IPv4, found IPv6"
        );
    }
}
