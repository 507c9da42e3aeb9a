//! Command-line and environment configuration.
//!
//! Every option can also be set through a `CIDR_*` environment variable,
//! including ones loaded from a `.env` file.

use crate::output::OutputFormat;
use crate::processing::{HostBitsPolicy, SummarizePolicy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[clap(
    name = "cidr-algebra",
    version,
    about = "Summarize, split and compare IPv4/IPv6 address sets"
)]
pub struct Config {
    #[clap(long, env = "CIDR_LOG_CONFIG", default_value = "log4rs.yml")]
    pub log_config: PathBuf,

    #[clap(long, value_enum, env = "CIDR_FORMAT", default_value_t = OutputFormat::Csv, global = true)]
    pub format: OutputFormat,

    /// Reject CIDR blocks with host bits set, or snap them to their network.
    #[clap(long, value_enum, env = "CIDR_HOST_BITS", default_value_t = HostBitsPolicy::Reject, global = true)]
    pub host_bits: HostBitsPolicy,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Merge all input lines into CIDR blocks, per address family.
    Summarize {
        #[clap(long, value_enum, default_value_t = SummarizePolicy::Exact)]
        policy: SummarizePolicy,
        /// Input files, `-` or none for stdin.
        files: Vec<PathBuf>,
    },
    /// Split one CIDR block into equal children.
    Split {
        cidr: String,
        #[clap(long, conflicts_with = "prefix", required_unless_present = "prefix")]
        count: Option<usize>,
        #[clap(long)]
        prefix: Option<u16>,
    },
    /// Addresses in A that are not in B.
    Diff { a: PathBuf, b: PathBuf },
    /// Addresses in both A and B.
    Intersect { a: PathBuf, b: PathBuf },
    /// Classify every line of B against the union of A.
    Contains { a: PathBuf, b: PathBuf },
}
