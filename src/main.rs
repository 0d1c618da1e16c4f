use anyhow::Result;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use zerto_graphite::cli::Cli;
use zerto_graphite::collector::{Collector, RunClock};
use zerto_graphite::config::SiteConfig;
use zerto_graphite::version::{NAME, VERSION};

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout is reserved for --pretty and --dry-run output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from_args(std::env::args_os());
    let clock = RunClock::now();
    tracing::debug!(pkg = NAME, version = VERSION, site = %cli.site, "starting");

    let sites = SiteConfig::load(&cli.servers)?;
    let collector = Collector::from_cli(&cli, &sites)?;

    let mut stdout = std::io::stdout().lock();
    let report = collector.run(&clock, &mut stdout).await?;
    tracing::debug!(
        site = collector.site(),
        samples = report.samples,
        targets = report.targets,
        lines = report.lines,
        "run complete"
    );
    Ok(())
}
