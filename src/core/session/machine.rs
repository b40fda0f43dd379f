//! Session actor.
//!
//! A [`SearchSession`] owns one [`QuerySession`] inside a spawned task.
//! User actions and transport callbacks are funnelled through channels
//! into that task, which is the only writer. Observers read snapshots
//! from a `watch` channel.
//!
//! Every opened stream gets a generation number. Starting or cancelling
//! bumps the generation, so frames still in flight from an aborted
//! stream are recognized and dropped.

use super::state::QuerySession;
use crate::core::config::Config;
use crate::core::credentials::{token, CredentialProvider};
use crate::core::error::Result;
use crate::core::services::Services;
use crate::core::stream::{
    route, FrameSink, StreamHandle, StreamRequest, StreamTransport, TransportEvent,
};
use crate::core::types::SearchQuery;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};

/// Immutable view of the session, shared with observers
pub type SessionSnapshot = Arc<QuerySession>;

pub type SessionWatcher = watch::Receiver<SessionSnapshot>;

#[derive(Debug)]
enum Command {
    Start { run_id: u64, query: SearchQuery },
    Cancel,
    UpdateExplanation { practitioner_id: String, explanation: String },
}

/// Run id allocation and the query `retry` re-issues.
///
/// Ids are handed out and their `Start` enqueued under one lock, so the
/// session task always sees runs in increasing order.
#[derive(Debug, Default)]
struct RunLedger {
    last_run: u64,
    last_query: Option<SearchQuery>,
}

/// Handle to a running session. Cheap to clone; the session task stops
/// (cancelling any open stream) once every handle is dropped.
#[derive(Clone)]
pub struct SearchSession {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: SessionWatcher,
    config: Arc<Config>,
    runs: Arc<Mutex<RunLedger>>,
}

impl SearchSession {
    /// Spawn the session task. Must be called inside a tokio runtime.
    pub fn new(
        config: Arc<Config>,
        transport: Arc<dyn StreamTransport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(QuerySession::new()));

        let actor = SessionActor {
            state: QuerySession::new(),
            config: Arc::clone(&config),
            transport,
            credentials,
            stream: None,
            generation: 0,
            events_tx,
            snapshots: snapshot_tx,
        };
        tokio::spawn(actor.run(commands_rx, events_rx));

        Self {
            commands: commands_tx,
            snapshots: snapshot_rx,
            config,
            runs: Arc::new(Mutex::new(RunLedger::default())),
        }
    }

    pub fn from_services(services: &Services) -> Self {
        Self::new(
            Arc::clone(&services.config),
            Arc::clone(&services.transport),
            Arc::clone(&services.credentials),
        )
    }

    /// Start a new search, superseding any search in progress.
    ///
    /// Returns the run id to pass to [`SearchSession::settled`].
    pub fn start(&self, query: SearchQuery) -> Result<u64> {
        let query = self.config.search.prepare(query)?;
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        runs.last_query = Some(query.clone());
        Ok(self.enqueue_run(&mut runs, query))
    }

    /// Abort the current stream. Merged items stay in the snapshot.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    /// Re-run the last submitted query; `None` if there was none
    pub fn retry(&self) -> Option<u64> {
        let mut runs = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        let query = runs.last_query.clone()?;
        Some(self.enqueue_run(&mut runs, query))
    }

    /// Caller holds the ledger lock until the command is queued
    fn enqueue_run(&self, runs: &mut RunLedger, query: SearchQuery) -> u64 {
        runs.last_run += 1;
        let run_id = runs.last_run;
        self.send(Command::Start { run_id, query });
        run_id
    }

    pub fn update_explanation(&self, practitioner_id: impl Into<String>, explanation: String) {
        self.send(Command::UpdateExplanation {
            practitioner_id: practitioner_id.into(),
            explanation,
        });
    }

    pub fn subscribe(&self) -> SessionWatcher {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Wait until run `run_id` no longer has an active stream, or has
    /// been superseded by a later run
    pub async fn settled(&self, run_id: u64) -> SessionSnapshot {
        let mut watcher = self.subscribe();
        let settled = watcher
            .wait_for(|s| s.run_id() > run_id || (s.run_id() == run_id && !s.is_stream_active()))
            .await
            .map(|snapshot| Arc::clone(&snapshot));

        match settled {
            Ok(snapshot) => snapshot,
            Err(_) => self.snapshot(),
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::error!("Session task is no longer running");
        }
    }
}

struct SessionActor {
    state: QuerySession,
    config: Arc<Config>,
    transport: Arc<dyn StreamTransport>,
    credentials: Arc<dyn CredentialProvider>,
    stream: Option<StreamHandle>,
    generation: u64,
    events_tx: mpsc::UnboundedSender<(u64, TransportEvent)>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<(u64, TransportEvent)>,
    ) {
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some((generation, event)) = events.recv() => {
                    self.handle_transport(generation, event);
                }
            }
        }

        self.abort_stream();
        tracing::debug!("Session task stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { run_id, query } => self.start(run_id, query).await,
            Command::Cancel => {
                self.abort_stream();
                if self.state.cancel() {
                    self.publish();
                }
            }
            Command::UpdateExplanation {
                practitioner_id,
                explanation,
            } => {
                if self.state.update_explanation(&practitioner_id, explanation) {
                    self.publish();
                } else {
                    tracing::debug!("No item '{}' to update", practitioner_id);
                }
            }
        }
    }

    async fn start(&mut self, run_id: u64, query: SearchQuery) {
        // The previous stream must be gone before the next request goes out
        self.abort_stream();
        let generation = self.generation;

        tracing::info!(run_id, query = %query.query, "Starting search");
        self.state = QuerySession::begin(run_id, query.clone());
        self.publish();

        let bearer_token = match self.credentials.bearer_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Could not obtain credentials: {}", e);
                self.state.on_setup_error(e.message());
                self.publish();
                return;
            }
        };
        if let Some(bearer) = &bearer_token {
            if token::is_expired(bearer) {
                tracing::warn!("Bearer token is expired or has no readable expiry, sending anyway");
            }
        }

        let request = StreamRequest {
            url: self.config.server.stream_url(),
            body: query,
            bearer_token,
        };
        let events = self.events_tx.clone();
        let sink: FrameSink = Box::new(move |event| {
            // Receiver only goes away when the session task has stopped
            let _ = events.send((generation, event));
        });
        self.stream = Some(self.transport.open(request, sink));
    }

    fn handle_transport(&mut self, generation: u64, event: TransportEvent) {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Dropping event from superseded stream"
            );
            return;
        }

        let changed = match event {
            TransportEvent::Frame(frame) => self.state.apply(route(&frame)),
            TransportEvent::Closed => {
                self.stream = None;
                self.state.on_closed()
            }
            TransportEvent::Failed(e) => {
                self.stream = None;
                self.state.on_transport_error(&e)
            }
        };

        if !self.state.is_stream_active() {
            // Terminal frame seen; stop reading even if the server keeps the body open
            self.abort_stream();
        }
        if changed {
            self.publish();
        }
    }

    /// Cancel the open stream and invalidate its in-flight events
    fn abort_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.cancel();
        }
        self.generation += 1;
    }

    fn publish(&self) {
        self.snapshots.send_replace(Arc::new(self.state.clone()));
    }
}
