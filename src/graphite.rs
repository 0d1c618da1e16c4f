// Graphite plaintext line protocol: one TCP connection per target, one line per metric.

use crate::models::{AggregatedMetrics, TargetMetrics};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Default Graphite plaintext listener port used by this deployment.
pub const DEFAULT_PORT: u16 = 2023;

/// Default first path component of every metric.
pub const DEFAULT_PREFIX: &str = "zerto";

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("connecting to graphite at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("sending {target} to graphite at {addr}: {source}")]
    Write {
        addr: String,
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// `<prefix>.<target>.<field> <value> <timestamp>\n`
pub fn format_line(prefix: &str, target: &str, field: &str, value: i64, timestamp: i64) -> String {
    format!("{}.{}.{} {} {}\n", prefix, target, field, value, timestamp)
}

/// All lines for one target, in field order.
pub fn format_target_lines(
    prefix: &str,
    target: &str,
    metrics: &TargetMetrics,
    timestamp: i64,
) -> Vec<String> {
    metrics
        .iter()
        .map(|(field, value)| format_line(prefix, target, field, *value, timestamp))
        .collect()
}

/// Every line for every target, targets in key order.
pub fn format_lines(aggregated: &AggregatedMetrics, prefix: &str, timestamp: i64) -> Vec<String> {
    aggregated
        .iter()
        .flat_map(|(target, metrics)| format_target_lines(prefix, target, metrics, timestamp))
        .collect()
}

/// Counts from one emission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub targets: usize,
    pub lines: usize,
}

pub struct GraphiteClient {
    host: String,
    port: u16,
    prefix: String,
}

impl GraphiteClient {
    pub fn new(host: impl Into<String>, port: u16, prefix: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            prefix: prefix.into(),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sends targets one after another. Stops at the first failure; targets already
    /// sent stay sent.
    pub async fn send_all(
        &self,
        aggregated: &AggregatedMetrics,
        timestamp: i64,
    ) -> Result<EmitSummary, EmitError> {
        let mut summary = EmitSummary::default();
        for (target, metrics) in aggregated {
            let lines = format_target_lines(&self.prefix, target, metrics, timestamp);
            self.send_target(target, &lines).await?;
            summary.targets += 1;
            summary.lines += lines.len();
        }
        Ok(summary)
    }

    /// Opens a connection, writes `lines`, closes it. The stream is dropped (and the
    /// socket closed) on every return path.
    #[instrument(skip(self, lines), fields(addr = %self.addr(), lines = lines.len()))]
    pub async fn send_target(&self, target_key: &str, lines: &[String]) -> Result<(), EmitError> {
        let addr = self.addr();
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| EmitError::Connect {
                addr: addr.clone(),
                source,
            })?;

        let write_err = |source| EmitError::Write {
            addr: addr.clone(),
            target: target_key.to_string(),
            source,
        };
        for line in lines {
            stream.write_all(line.as_bytes()).await.map_err(write_err)?;
        }
        stream.shutdown().await.map_err(write_err)?;
        debug!("Target sent");
        Ok(())
    }
}
