use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use super::{SessionStore, StoreError, ACTIVE_SESSION_MARKER};
use crate::models::{session::deserialize_id, EventRecord, Session, SessionSummary};

/// Error body the backend sends with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    id: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedSession {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
}

/// Session backend reached over HTTP with a bearer credential.
#[derive(Clone)]
pub struct HttpSessionStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSessionStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("failed to build HTTP client with timeout: {err}");
                Client::new()
            });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(classify_failure(status, body))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, StoreError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|err| StoreError::Decode(err.to_string()))
    }
}

fn classify_failure(status: StatusCode, body: ErrorBody) -> StoreError {
    if status == StatusCode::UNAUTHORIZED {
        return StoreError::Unauthorized;
    }

    let active_id = body.id.as_ref().and_then(|value| match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    });

    match (body.error, active_id) {
        (Some(message), Some(id)) if message == ACTIVE_SESSION_MARKER => {
            StoreError::SessionAlreadyActive { id }
        }
        (message, _) => StoreError::Rejected {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| "unknown error".to_string()),
        },
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn create_session(&self) -> Result<String, StoreError> {
        let created: CreatedSession = self
            .send_json(self.client.post(self.url("/sesiones")))
            .await?;
        Ok(created.id)
    }

    async fn append_event(&self, record: &EventRecord) -> Result<(), StoreError> {
        self.send(self.client.post(self.url("/eventos")).json(record))
            .await
            .map(|_| ())
    }

    async fn finalize_session(
        &self,
        session_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StoreError> {
        let path = format!("/sesiones/{session_id}/finalizar");
        self.send(self.client.patch(self.url(&path)).json(summary))
            .await
            .map(|_| ())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.send_json(self.client.get(self.url("/sesiones"))).await
    }

    async fn get_session(&self, session_id: &str) -> Result<Session, StoreError> {
        let path = format!("/sesiones/{session_id}");
        self.send_json(self.client.get(self.url(&path))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(raw: &str) -> ErrorBody {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn conflict_body_maps_to_active_session() {
        let err = classify_failure(
            StatusCode::BAD_REQUEST,
            body(r#"{ "error": "Ya hay una sesión activa", "id": 42 }"#),
        );
        assert!(matches!(err, StoreError::SessionAlreadyActive { id } if id == "42"));
    }

    #[test]
    fn marker_without_id_is_plain_rejection() {
        let err = classify_failure(
            StatusCode::CONFLICT,
            body(r#"{ "error": "Ya hay una sesión activa" }"#),
        );
        assert!(matches!(err, StoreError::Rejected { status: 409, .. }));
    }

    #[test]
    fn unauthorized_wins_over_body() {
        let err = classify_failure(StatusCode::UNAUTHORIZED, ErrorBody::default());
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let store = HttpSessionStore::new("http://localhost:3001/", None, Duration::from_secs(5));
        assert_eq!(store.url("/eventos"), "http://localhost:3001/eventos");
    }
}
