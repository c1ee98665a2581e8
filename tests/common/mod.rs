use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Barrier;
use tokio::time::sleep;

type Respond = dyn Fn(i64) -> (u16, String) + Send + Sync;

#[derive(Default, Clone)]
pub struct Behavior {
    /// Every connection waits here before responding.
    pub barrier: Option<Arc<Barrier>>,
    pub delay: Option<Duration>,
    /// Only the first request to arrive waits this long.
    pub slow_first: Option<Duration>,
    pub arrivals: Arc<AtomicUsize>,
}

pub struct MockServer {
    pub port: u16,
    pub ids: Arc<Mutex<Vec<i64>>>,
    pub peak: Arc<AtomicUsize>,
}

impl MockServer {
    pub fn ids(&self) -> Vec<i64> {
        self.ids.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Port that nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn serve<F>(respond: F) -> MockServer
where
    F: Fn(i64) -> (u16, String) + Send + Sync + 'static,
{
    serve_with(respond, Behavior::default()).await
}

pub async fn serve_with<F>(respond: F, behavior: Behavior) -> MockServer
where
    F: Fn(i64) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let ids = Arc::new(Mutex::new(Vec::new()));
    let peak = Arc::new(AtomicUsize::new(0));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let respond: Arc<Respond> = Arc::new(respond);

    {
        let ids = ids.clone();
        let peak = peak.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let ids = ids.clone();
                let peak = peak.clone();
                let in_flight = in_flight.clone();
                let respond = respond.clone();
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    handle(socket, respond, behavior, ids, peak, in_flight).await;
                });
            }
        });
    }

    MockServer { port, ids, peak }
}

async fn handle(
    mut socket: TcpStream,
    respond: Arc<Respond>,
    behavior: Behavior,
    ids: Arc<Mutex<Vec<i64>>>,
    peak: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    let id = path
        .split_once("?id=")
        .and_then(|(_, id)| id.parse::<i64>().ok())
        .unwrap_or_default();
    ids.lock().unwrap().push(id);

    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    peak.fetch_max(now, Ordering::SeqCst);

    if let Some(barrier) = &behavior.barrier {
        barrier.wait().await;
    }
    if let Some(delay) = behavior.delay {
        sleep(delay).await;
    }
    let arrival = behavior.arrivals.fetch_add(1, Ordering::SeqCst);
    if let (0, Some(delay)) = (arrival, behavior.slow_first) {
        sleep(delay).await;
    }

    let (status, body) = if path.starts_with("/api/tests") {
        respond(id)
    } else {
        (404, String::new())
    };
    in_flight.fetch_sub(1, Ordering::SeqCst);

    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}
