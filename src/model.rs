use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;
pub const ENDPOINT: &str = "/api/tests";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self, id: i64) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}{ENDPOINT}?id={id}", self.host, self.port)
        } else {
            format!("http://{}:{}{ENDPOINT}?id={id}", self.host, self.port)
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// One batch: `workers` requests against the same target and id.
#[derive(Clone, Debug)]
pub struct Config {
    pub target: Target,
    pub workers: usize,
    pub id: i64,
    /// `None` (or zero) blocks on the network call indefinitely.
    pub timeout: Option<Duration>,
    /// Upper bound on requests in flight. `None` (or `Some(0)`) runs all at once.
    pub max_in_flight: Option<usize>,
}

impl Config {
    pub fn new(target: Target, workers: usize, id: i64) -> Self {
        Self {
            target,
            workers,
            id,
            timeout: None,
            max_in_flight: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success { status: u16, body: String },
    HttpFailure { status: u16 },
    TransportFailure { description: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

#[derive(Clone, Debug)]
pub struct WorkerReport {
    pub ordinal: usize,
    pub outcome: Outcome,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl WorkerReport {
    pub fn latency(&self) -> chrono::Duration {
        self.end - self.begin
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub http_failures: usize,
    pub transport_failures: usize,
    pub elapsed_ms: i64,
}

impl Summary {
    pub fn from_reports(reports: &[WorkerReport]) -> Self {
        let mut summary = Summary {
            total: reports.len(),
            ..Default::default()
        };
        for report in reports {
            match report.outcome {
                Outcome::Success { .. } => summary.succeeded += 1,
                Outcome::HttpFailure { .. } => summary.http_failures += 1,
                Outcome::TransportFailure { .. } => summary.transport_failures += 1,
            }
        }
        let begin = reports.iter().map(|r| r.begin).min();
        let end = reports.iter().map(|r| r.end).max();
        if let (Some(begin), Some(end)) = (begin, end) {
            summary.elapsed_ms = (end - begin).num_milliseconds();
        }
        summary
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests: {} succeeded, {} failed, {} errored in {}ms",
            self.total, self.succeeded, self.http_failures, self.transport_failures, self.elapsed_ms
        )
    }
}
