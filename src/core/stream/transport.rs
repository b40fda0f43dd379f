//! Streaming HTTP transport.
//!
//! [`StreamTransport::open`] posts a search request and hands every
//! decoded frame to a callback, in arrival order, from a single read
//! loop. One chunk is fully decoded and its frames delivered before the
//! next chunk is awaited.
//!
//! Cancelling the returned [`StreamHandle`] ends the read loop without
//! delivering anything further; in particular it never reports a
//! failure.

use super::decoder::{FrameDecoder, RawFrame};
use crate::core::config::ServerConfig;
use crate::core::error::{MatchStreamError, Result, TransportError};
use crate::core::types::SearchQuery;
use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything needed to open one stream
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub url: String,
    pub body: SearchQuery,
    pub bearer_token: Option<String>,
}

/// What the transport reports to its sink
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Frame(RawFrame),
    /// Body ended normally
    Closed,
    /// Genuine network failure (never sent after cancellation)
    Failed(TransportError),
}

/// Per-stream callback, invoked synchronously from the read loop
pub type FrameSink = Box<dyn FnMut(TransportEvent) + Send + 'static>;

pub trait StreamTransport: Send + Sync {
    fn open(&self, request: StreamRequest, sink: FrameSink) -> StreamHandle;
}

/// Cancellable handle to an open stream
#[derive(Debug)]
pub struct StreamHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    pub fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self {
            token,
            task: Some(task),
        }
    }

    /// Handle for a transport that drives the stream some other way
    pub fn detached(token: CancellationToken) -> Self {
        Self { token, task: None }
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the read loop to exit
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Stream task panicked: {}", e);
            }
        }
    }
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    stall_timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_sec))
            .build()
            .map_err(|e| {
                MatchStreamError::ConfigError(format!("Failed to build HTTP client: {e}"))
            })?;

        let stall_timeout =
            (config.stall_timeout_sec > 0).then(|| Duration::from_secs(config.stall_timeout_sec));

        Ok(Self {
            client,
            stall_timeout,
        })
    }
}

impl StreamTransport for HttpTransport {
    fn open(&self, request: StreamRequest, sink: FrameSink) -> StreamHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(read_loop(
            self.client.clone(),
            request,
            self.stall_timeout,
            token.clone(),
            sink,
        ));
        StreamHandle::new(token, task)
    }
}

async fn read_loop(
    client: reqwest::Client,
    request: StreamRequest,
    stall_timeout: Option<Duration>,
    token: CancellationToken,
    mut sink: FrameSink,
) {
    tracing::info!("Opening stream: {}", request.url);

    let response = tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("Stream cancelled before response");
            return;
        }
        response = send(&client, &request) => response,
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Stream request failed: {}", e);
            sink(TransportEvent::Failed(e));
            return;
        }
    };

    let body = response.bytes_stream();
    tokio::pin!(body);
    let mut decoder = FrameDecoder::new();
    let mut frames_delivered = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Stream cancelled after {} frames", frames_delivered);
                return;
            }
            next = next_chunk(&mut body, stall_timeout) => next,
        };

        match next {
            Ok(Some(chunk)) => {
                for frame in decoder.feed(&chunk) {
                    if token.is_cancelled() {
                        return;
                    }
                    tracing::debug!(event = ?frame.event, bytes = frame.data.len(), "Frame received");
                    frames_delivered += 1;
                    sink(TransportEvent::Frame(frame));
                }
            }
            Ok(None) => {
                decoder.finish();
                tracing::info!("Stream closed after {} frames", frames_delivered);
                sink(TransportEvent::Closed);
                return;
            }
            Err(e) => {
                if token.is_cancelled() {
                    return;
                }
                tracing::error!("Stream read failed: {}", e);
                sink(TransportEvent::Failed(e));
                return;
            }
        }
    }
}

async fn send(
    client: &reqwest::Client,
    request: &StreamRequest,
) -> std::result::Result<reqwest::Response, TransportError> {
    let mut builder = client
        .post(&request.url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "text/event-stream")
        .json(&request.body);

    if let Some(token) = &request.bearer_token {
        builder = builder.bearer_auth(token);
    }

    let response = builder.send().await.map_err(classify_request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    Ok(response)
}

async fn next_chunk<S, B>(
    body: &mut S,
    stall_timeout: Option<Duration>,
) -> std::result::Result<Option<B>, TransportError>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
{
    let next = match stall_timeout {
        Some(limit) => tokio::time::timeout(limit, body.next())
            .await
            .map_err(|_| TransportError::Stalled {
                idle_secs: limit.as_secs(),
            })?,
        None => body.next().await,
    };

    match next {
        None => Ok(None),
        Some(Ok(chunk)) => Ok(Some(chunk)),
        Some(Err(e)) => Err(TransportError::NetworkChanged(e.to_string())),
    }
}

fn classify_request_error(e: reqwest::Error) -> TransportError {
    if e.is_connect() || e.is_timeout() {
        TransportError::ConnectionFailed(e.to_string())
    } else {
        TransportError::Request(e.to_string())
    }
}
