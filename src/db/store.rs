use async_trait::async_trait;
use chrono::Utc;

use super::{Database, OpenOutcome};
use crate::models::{EventRecord, Session, SessionSummary};
use crate::store::{SessionStore, StoreError};

fn not_found(session_id: &str) -> StoreError {
    StoreError::Rejected {
        status: 404,
        message: format!("session {session_id} not found"),
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn create_session(&self) -> Result<String, StoreError> {
        match self.open_session(Utc::now()).await? {
            OpenOutcome::Opened(id) => Ok(id),
            OpenOutcome::AlreadyActive(id) => Err(StoreError::SessionAlreadyActive { id }),
        }
    }

    async fn append_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        if self.insert_event(record).await? {
            Ok(())
        } else {
            Err(not_found(&record.session_id))
        }
    }

    async fn finalize_session(
        &self,
        session_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StoreError> {
        if self.close_session(session_id, summary).await? {
            Ok(())
        } else {
            Err(not_found(session_id))
        }
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(Database::list_sessions(self).await?)
    }

    async fn get_session(&self, session_id: &str) -> Result<Session, StoreError> {
        self.get_session_with_events(session_id)
            .await?
            .ok_or_else(|| not_found(session_id))
    }
}
