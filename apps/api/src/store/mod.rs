//! Session store: the ordered list of candidate sessions plus the tab
//! selection, persisted as one JSON blob under `STATE_KEY`.
//!
//! Mutations are synchronous and in-memory; every mutation queues the full
//! snapshot for a single background writer, which applies writes in order.

pub mod blob;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::session::{AppSnapshot, CandidateSession, Tab};
use blob::BlobStore;

/// Well-known key of the persisted snapshot.
pub const STATE_KEY: &str = "ai-interview-assistant:state";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Session not found: {0}")]
    UnknownSession(Uuid),
}

enum PersistCommand {
    Write(String),
    Flush(oneshot::Sender<()>),
}

pub struct SessionStore {
    snapshot: AppSnapshot,
    writer: mpsc::UnboundedSender<PersistCommand>,
}

impl SessionStore {
    /// Loads the persisted snapshot, falling back to a single fresh session
    /// when it is absent, unreadable or empty. Must be called inside a tokio
    /// runtime: the background writer is spawned here.
    pub async fn load(blobs: Arc<dyn BlobStore>) -> Self {
        let restored = match blobs.get(STATE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<AppSnapshot>(&raw) {
                Ok(snapshot) if !snapshot.sessions.is_empty() => Some(snapshot),
                Ok(_) => {
                    warn!("Persisted state has no sessions, starting fresh");
                    None
                }
                Err(e) => {
                    warn!("Persisted state is unreadable, starting fresh: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read persisted state, starting fresh: {e}");
                None
            }
        };

        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(blobs, rx));

        match restored {
            Some(snapshot) => {
                info!("Restored {} session(s)", snapshot.sessions.len());
                Self { snapshot, writer }
            }
            None => {
                let store = Self {
                    snapshot: AppSnapshot::default(),
                    writer,
                };
                store.persist();
                store
            }
        }
    }

    pub fn snapshot(&self) -> &AppSnapshot {
        &self.snapshot
    }

    pub fn sessions(&self) -> &[CandidateSession] {
        &self.snapshot.sessions
    }

    /// The most recently created session.
    pub fn active(&self) -> &CandidateSession {
        self.snapshot
            .active()
            .expect("session list always holds at least one session")
    }

    pub fn get(&self, id: Uuid) -> Option<&CandidateSession> {
        self.snapshot.sessions.iter().find(|s| s.id == id)
    }

    /// Replaces the stored session with the same id, wholesale.
    pub fn replace(&mut self, session: CandidateSession) -> Result<(), StoreError> {
        let slot = self
            .snapshot
            .sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or(StoreError::UnknownSession(session.id))?;
        *slot = session;
        self.persist();
        Ok(())
    }

    /// Appends a fresh session, which becomes the active one. Earlier
    /// sessions stay in the list for reporting.
    pub fn start_new(&mut self) -> &CandidateSession {
        self.snapshot.sessions.push(CandidateSession::new());
        self.persist();
        self.active()
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        if self.snapshot.active_tab != tab {
            self.snapshot.active_tab = tab;
            self.persist();
        }
    }

    /// A receiver that resolves once every write queued so far has been
    /// handed to the backend. It does not borrow the store.
    pub fn flush_handle(&self) -> oneshot::Receiver<()> {
        let (ack, done) = oneshot::channel();
        let _ = self.writer.send(PersistCommand::Flush(ack));
        done
    }

    fn persist(&self) {
        match serde_json::to_string(&self.snapshot) {
            Ok(blob) => {
                if self.writer.send(PersistCommand::Write(blob)).is_err() {
                    error!("State writer has stopped; change not persisted");
                }
            }
            Err(e) => error!("Failed to serialize state: {e}"),
        }
    }
}

async fn run_writer(blobs: Arc<dyn BlobStore>, mut rx: mpsc::UnboundedReceiver<PersistCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Write(blob) => {
                if let Err(e) = blobs.put(STATE_KEY, &blob).await {
                    error!("Failed to persist state: {e}");
                }
            }
            PersistCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
