use crate::model::{Outcome, WorkerReport};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

/// Receives every report of a batch, one at a time, from a single task.
pub trait Sink: Send + 'static {
    fn report(&mut self, report: &WorkerReport);

    fn finish(&mut self) {}
}

impl<F> Sink for F
where
    F: FnMut(&WorkerReport) + Send + 'static,
{
    fn report(&mut self, report: &WorkerReport) {
        self(report)
    }
}

pub fn lines(report: &WorkerReport) -> Vec<String> {
    let label = format!("Request {}", report.ordinal);
    match &report.outcome {
        Outcome::Success { status, body } => vec![
            format!("{label}: Request successful!"),
            format!("{label}: Response Code: {status}"),
            format!("{label}: Response Content:"),
            body.clone(),
        ],
        Outcome::HttpFailure { status } => {
            vec![format!("{label}: Failed. HTTP Status Code: {status}")]
        }
        Outcome::TransportFailure { description } => {
            vec![format!("{label}: An error occurred: {description}")]
        }
    }
}

/// Prints reports to stdout under a progress bar drawn on stderr.
pub struct Console {
    pb: ProgressBar,
}

impl Console {
    pub fn new(total: usize) -> anyhow::Result<Self> {
        let sty = ProgressStyle::with_template("{spinner} {pos}/{len} requests completed")?;
        let pb = ProgressBar::new(total as u64);
        pb.set_style(sty);
        Ok(Self { pb })
    }
}

impl Sink for Console {
    fn report(&mut self, report: &WorkerReport) {
        let mut lines = lines(report);
        if let Some(head) = lines.first_mut() {
            *head = if report.outcome.is_success() {
                style(head.as_str()).green().to_string()
            } else {
                style(head.as_str()).red().to_string()
            };
        }

        self.pb.suspend(|| {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let written = lines
                .iter()
                .try_for_each(|line| writeln!(out, "{line}"))
                .and_then(|_| out.flush());
            if let Err(e) = written {
                log::warn!("request {}: could not write report: {e}", report.ordinal);
            }
        });
        self.pb.inc(1);
    }

    fn finish(&mut self) {
        self.pb.finish_and_clear();
    }
}
