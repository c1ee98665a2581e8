use crate::model::{Config, WorkerReport};
use crate::report::Sink;
use crate::worker::worker;
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// Runs one batch: spawns every worker, then waits for all of them.
///
/// Reports reach `sink` in completion order through a single task, so lines from
/// different workers never interleave. The returned reports are ordered by ordinal.
/// Per-request failures are part of the reports; the only error is failing to
/// build the HTTP client.
pub async fn run<S: Sink>(config: &Config, mut sink: S) -> anyhow::Result<Vec<WorkerReport>> {
    if config.workers == 0 {
        sink.finish();
        return Ok(vec![]);
    }

    let mut builder = reqwest::Client::builder().no_proxy();
    if let Some(timeout) = config.timeout.filter(|t| !t.is_zero()) {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().context("failed to build HTTP client")?;

    let gate = match config.max_in_flight {
        Some(limit) if limit > 0 => Some(Arc::new(Semaphore::new(limit))),
        _ => None,
    };

    let url = config.target.url(config.id);
    log::info!("sending {} requests to {url}", config.workers);

    let (tx, mut rx) = mpsc::channel(100);

    let mut set = JoinSet::new();
    for ordinal in 0..config.workers {
        set.spawn(worker(
            ordinal,
            client.clone(),
            url.clone(),
            gate.clone(),
            tx.clone(),
        ));
    }

    drop(tx);

    let h = tokio::spawn(async move {
        let mut reports = vec![];
        while let Some(report) = rx.recv().await {
            sink.report(&report);
            reports.push(report);
        }
        sink.finish();
        reports
    });

    while let Some(res) = set.join_next().await {
        match res {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("request {}: report dropped", e.0.ordinal),
            Err(e) => log::error!("worker did not finish: {e}"),
        }
    }

    let mut reports = h.await.context("report collector failed")?;
    reports.sort_by_key(|r| r.ordinal);
    Ok(reports)
}
