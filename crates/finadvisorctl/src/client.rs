//! HTTP client for communicating with finadvisord.

use crate::errors::{EXIT_DAEMON_UNAVAILABLE, EXIT_GENERAL_ERROR, EXIT_INVALID_RESPONSE};
use finadvisor_common::{AdviceResponse, ErrorResponse, FinancialProfile, HealthResponse};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default daemon address
pub const DEFAULT_URL: &str = "http://127.0.0.1:8000";

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(
        "Cannot reach finadvisor daemon at {url}: {source}\n\n\
         Is finadvisord running? Use --local to evaluate without a daemon."
    )]
    Unavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Daemon rejected the profile ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Invalid response from daemon: {0}")]
    InvalidResponse(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(#[source] reqwest::Error),
}

impl ClientError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Unavailable { .. } => EXIT_DAEMON_UNAVAILABLE,
            ClientError::InvalidResponse(_) => EXIT_INVALID_RESPONSE,
            ClientError::Rejected { .. } | ClientError::Setup(_) => EXIT_GENERAL_ERROR,
        }
    }
}

/// Client for communicating with finadvisord
pub struct AdvisorClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdvisorClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("finadvisorctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Setup)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit a profile to `POST /advice`
    pub async fn advise(&self, profile: &FinancialProfile) -> Result<AdviceResponse, ClientError> {
        let url = format!("{}/advice", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(profile)
            .send()
            .await
            .map_err(|source| ClientError::Unavailable {
                url: url.clone(),
                source,
            })?;

        Self::decode(response).await
    }

    /// Query `GET /v1/health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/v1/health", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Unavailable {
                url: url.clone(),
                source,
            })?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let err: ErrorResponse = serde_json::from_str(&body)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                detail: err.detail,
            });
        }

        if !status.is_success() {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                detail: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}
