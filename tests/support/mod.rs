use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use spacex_queries::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const GRAPHQL_PATH: &str = "/graphql/";

#[derive(Clone)]
struct StubState {
    hits: Arc<AtomicUsize>,
    delay: Option<Duration>,
    status: StatusCode,
}

/// In-process GraphQL endpoint that echoes request bodies back.
pub struct StubServer {
    endpoint: String,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn echo() -> Self {
        Self::spawn(None, StatusCode::OK).await
    }

    /// Echo server that sleeps before answering.
    pub async fn delayed(delay: Duration) -> Self {
        Self::spawn(Some(delay), StatusCode::OK).await
    }

    /// Echo server that answers with a fixed status.
    pub async fn with_status(status: StatusCode) -> Self {
        Self::spawn(None, status).await
    }

    async fn spawn(delay: Option<Duration>, status: StatusCode) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = StubState {
            hits: hits.clone(),
            delay,
            status,
        };
        let app = Router::new()
            .route(GRAPHQL_PATH, post(echo))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            endpoint: format!("http://{addr}{GRAPHQL_PATH}"),
            hits,
            handle,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            ..ClientConfig::default()
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn echo(State(state): State<StubState>, headers: HeaderMap, body: Bytes) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == "application/json");
    if !is_json {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json").into_response();
    }

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// What a [`RawServer`] does after sending a short body.
#[derive(Clone, Copy)]
pub enum AfterBody {
    Close,
    Stall,
}

/// Socket-level endpoint that promises more body bytes than it sends.
pub struct RawServer {
    endpoint: String,
    handle: JoinHandle<()>,
}

impl RawServer {
    pub async fn spawn(after: AfterBody) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind raw stub");
        let addr = listener.local_addr().expect("raw stub addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            read_request(&mut socket).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\nshort",
                )
                .await
                .expect("write partial response");
            socket.flush().await.expect("flush");
            match after {
                AfterBody::Close => {
                    let _ = socket.shutdown().await;
                }
                AfterBody::Stall => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                }
            }
        });

        Self {
            endpoint: format!("http://{addr}{GRAPHQL_PATH}"),
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            ..ClientConfig::default()
        }
    }
}

impl Drop for RawServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// Drain headers and the declared body so closing never resets the connection.
async fn read_request(socket: &mut TcpStream) {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.expect("read request");
        if n == 0 {
            return;
        }
        request.extend_from_slice(&chunk[..n]);

        let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
        let body_len = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= head_end + 4 + body_len {
            return;
        }
    }
}

/// Pull the `query` string out of an echoed envelope.
pub fn echoed_query(body: &[u8]) -> String {
    let envelope: serde_json::Value = serde_json::from_slice(body).expect("echoed JSON");
    let object = envelope.as_object().expect("envelope is an object");
    assert_eq!(object.len(), 1, "envelope carries only the query field");
    object["query"]
        .as_str()
        .expect("query is a string")
        .to_string()
}
