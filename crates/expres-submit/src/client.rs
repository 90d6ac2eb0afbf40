//! Create-incident API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use expres_core::config::ApiConfig;
use expres_core::error::{ExpresError, Result};

use crate::payload::{CreateIncidentResponse, SubmissionPayload};

/// Failure of a create-incident call. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("No autorizado.")]
    Unauthorized { status: u16 },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Respuesta inesperada del servidor al crear la incidencia.")]
    InvalidResponse { detail: String },
}

/// Backend that accepts express incidents.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    async fn create_incident(
        &self,
        payload: &SubmissionPayload,
    ) -> std::result::Result<CreateIncidentResponse, ApiError>;
}

/// Error body shape used by the backend on non-2xx answers.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `IncidentApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIncidentApi {
    client: Client,
    url: String,
    bearer_token: Option<String>,
}

impl HttpIncidentApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExpresError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.create_incident_url(),
            bearer_token: config
                .bearer_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Map a non-2xx answer to an error, preferring the server's own message.
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ApiError::Unauthorized {
            status: status.as_u16(),
        };
    }
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Error {}", status.as_u16()));
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl IncidentApi for HttpIncidentApi {
    async fn create_incident(
        &self,
        payload: &SubmissionPayload,
    ) -> std::result::Result<CreateIncidentResponse, ApiError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        tracing::info!(url = %self.url, user_id = %payload.user_id, "Creating express incident");
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Create incident request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            let err = status_error(status, &body);
            tracing::warn!(status = status.as_u16(), error = %err, "Create incident rejected");
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Undecodable create incident response");
            ApiError::InvalidResponse {
                detail: e.to_string(),
            }
        })
    }
}
