// One collection run: resolve site → fetch samples → aggregate → emit.
// Sequential; nothing is kept between runs.

use crate::aggregation::{self, DomainMode};
use crate::cli::Cli;
use crate::config::SiteConfig;
use crate::graphite::{self, GraphiteClient};
use crate::zerto_repo::{SampleWindow, ZertoRepo};
use anyhow::Context;
use chrono::Local;
use std::io::Write;
use tracing::{info, warn};

/// Clock readings taken once at run start and reused for every line.
#[derive(Debug, Clone)]
pub struct RunClock {
    /// Seconds since the epoch.
    pub timestamp: i64,
    pub window: SampleWindow,
}

impl RunClock {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            timestamp: now.timestamp(),
            window: SampleWindow::ending_at(&now),
        }
    }
}

/// Where the aggregated metrics go.
pub enum Output {
    Graphite(GraphiteClient),
    /// Lines written to the run's writer instead of a socket.
    DryRun { prefix: String },
}

/// What one run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub samples: usize,
    pub targets: usize,
    pub lines: usize,
}

pub struct Collector {
    site: String,
    repo: ZertoRepo,
    output: Output,
    domain_mode: DomainMode,
    pretty: bool,
}

impl Collector {
    pub fn new(site: impl Into<String>, repo: ZertoRepo, output: Output) -> Self {
        Self {
            site: site.into(),
            repo,
            output,
            domain_mode: DomainMode::default(),
            pretty: false,
        }
    }

    pub fn with_domain_mode(mut self, mode: DomainMode) -> Self {
        self.domain_mode = mode;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Builds the collector from CLI options. The site is resolved first, so an
    /// unknown site fails here before any connection is attempted.
    pub fn from_cli(cli: &Cli, sites: &SiteConfig) -> anyhow::Result<Self> {
        let fqdn = sites.resolve(&cli.site).inspect_err(|_| {
            warn!(
                site = %cli.site,
                known = ?sites.sites().collect::<Vec<_>>(),
                "unknown site"
            );
        })?;

        let output = if cli.dry_run {
            Output::DryRun {
                prefix: cli.prefix.clone(),
            }
        } else {
            let host = cli
                .graphite
                .as_deref()
                .filter(|h| !h.is_empty())
                .context("--graphite is required unless --dry-run is given")?;
            Output::Graphite(GraphiteClient::new(host, cli.port, cli.prefix.clone()))
        };

        let repo = ZertoRepo::connect(fqdn)?;
        Ok(Self::new(cli.site.clone(), repo, output)
            .with_domain_mode(cli.domain_mode())
            .with_pretty(cli.pretty))
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    /// Runs the pipeline once. `out` receives the pretty-printed samples and
    /// dry-run lines.
    pub async fn run(&self, clock: &RunClock, out: &mut impl Write) -> anyhow::Result<RunReport> {
        info!(
            site = %self.site,
            url = %self.repo.samples_url(),
            from = %clock.window.from,
            to = %clock.window.to,
            "fetching samples"
        );
        let samples = self.repo.get_samples(&clock.window).await?;

        if self.pretty {
            let json = serde_json::to_string_pretty(&samples)?;
            writeln!(out, "{}", json)?;
        }

        let aggregated = aggregation::aggregate(&samples, &self.site, self.domain_mode);
        let mut report = RunReport {
            samples: samples.len(),
            targets: aggregated.len(),
            ..Default::default()
        };

        match &self.output {
            Output::Graphite(client) => {
                let summary = client
                    .send_all(&aggregated, clock.timestamp)
                    .await
                    .context("emitting to graphite")?;
                report.lines = summary.lines;
                info!(
                    site = %self.site,
                    addr = %client.addr(),
                    samples = report.samples,
                    targets = summary.targets,
                    lines = summary.lines,
                    "metrics sent"
                );
            }
            Output::DryRun { prefix } => {
                let lines = graphite::format_lines(&aggregated, prefix, clock.timestamp);
                for line in &lines {
                    out.write_all(line.as_bytes())?;
                }
                report.lines = lines.len();
                info!(
                    site = %self.site,
                    samples = report.samples,
                    targets = report.targets,
                    lines = report.lines,
                    "dry run, nothing sent"
                );
            }
        }
        out.flush()?;
        Ok(report)
    }
}
