use crate::model::{Outcome, WorkerReport};
use chrono::Utc;
use reqwest::StatusCode;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Performs one GET against `url`. Every failure is folded into the returned `Outcome`.
pub async fn request(client: &reqwest::Client, url: &str) -> Outcome {
    let response = match client.get(url).send().await {
        Ok(res) => res,
        Err(e) => {
            return Outcome::TransportFailure {
                description: describe(&e),
            }
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return Outcome::HttpFailure {
            status: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => Outcome::Success {
            status: status.as_u16(),
            body,
        },
        Err(e) => Outcome::TransportFailure {
            description: describe(&e),
        },
    }
}

// reqwest's top-level message hides the cause ("error sending request for url ..."),
// while hyper's messages already embed their own sources.
fn describe(e: &(dyn Error + 'static)) -> String {
    let mut description = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !description.contains(&text) {
            description.push_str(": ");
            description.push_str(&text);
        }
        source = cause.source();
    }
    description
}

pub async fn worker(
    ordinal: usize,
    client: reqwest::Client,
    url: String,
    gate: Option<Arc<Semaphore>>,
    tx: mpsc::Sender<WorkerReport>,
) -> Result<(), mpsc::error::SendError<WorkerReport>> {
    let _permit = match gate {
        Some(gate) => gate.acquire_owned().await.ok(),
        None => None,
    };

    log::debug!("request {ordinal}: GET {url}");
    let begin = Utc::now();
    let outcome = request(&client, &url).await;
    let end = Utc::now();
    log::debug!(
        "request {ordinal}: finished in {}ms",
        (end - begin).num_milliseconds()
    );

    tx.send(WorkerReport {
        ordinal,
        outcome,
        begin,
        end,
    })
    .await
}
