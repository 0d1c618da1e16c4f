// Command-line options.

use crate::aggregation::DomainMode;
use crate::config::{DEFAULT_SERVERS_FILE, SERVERS_FILE_ENV};
use crate::graphite::{DEFAULT_PORT, DEFAULT_PREFIX};
use crate::version::{NAME, VERSION};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Collects data from a Zerto server and stores it in Graphite.
#[derive(Debug, Clone, Parser)]
#[command(name = NAME, version = VERSION, about, long_about = None)]
pub struct Cli {
    /// Site of the Zerto server (key in the site table)
    pub site: String,

    /// FQDN of the Graphite server
    #[arg(short, long)]
    pub graphite: Option<String>,

    /// Port of the Graphite plaintext listener
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Prefix for the Graphite metric paths
    #[arg(short = 'x', long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Print the fetched JSON before processing (also accepted as -pp)
    #[arg(long)]
    pub pretty: bool,

    /// Site table mapping site names to ZVM fqdns
    #[arg(short = 'c', long, env = SERVERS_FILE_ENV, default_value = DEFAULT_SERVERS_FILE)]
    pub servers: PathBuf,

    /// Drop the domain from cluster names (text after the first '.')
    #[arg(long)]
    pub strip_domain: bool,

    /// Print the Graphite lines to stdout instead of sending them
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Parses `args` after rewriting the single-dash `-pp` into `--pretty`.
    pub fn parse_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::parse_from(normalize_args(args))
    }

    /// Like `parse_from_args`, returning the clap error instead of exiting.
    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }

    pub fn domain_mode(&self) -> DomainMode {
        if self.strip_domain {
            DomainMode::Strip
        } else {
            DomainMode::Literal
        }
    }
}

/// clap short flags are one character; `-pp` would parse as `-p p`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "-pp" {
                OsString::from("--pretty")
            } else {
                arg
            }
        })
        .collect()
}
