//! The session backend as a capability.
//!
//! The engine and coordinator only talk to `dyn SessionStore`; transports live
//! behind it (`HttpSessionStore` for the hosted backend, `db::Database` for
//! offline use).

pub mod http;

pub use http::HttpSessionStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{EventRecord, Session, SessionSummary};

/// Marker the backend puts in `error` when the caller already owns an active session.
pub const ACTIVE_SESSION_MARKER: &str = "Ya hay una sesión activa";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller already has a session open; `id` identifies it.
    #[error("a session is already active ({id})")]
    SessionAlreadyActive { id: String },
    #[error("credential rejected or expired")]
    Unauthorized,
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed store response: {0}")]
    Decode(String),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session and returns its id.
    async fn create_session(&self) -> Result<String, StoreError>;

    async fn append_event(&self, record: &EventRecord) -> Result<(), StoreError>;

    async fn finalize_session(
        &self,
        session_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StoreError>;

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError>;

    async fn get_session(&self, session_id: &str) -> Result<Session, StoreError>;
}
