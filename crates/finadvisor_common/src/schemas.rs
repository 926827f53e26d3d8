//! JSON schemas for the finadvisor API

use crate::types::Advice;
use serde::{Deserialize, Serialize};

/// Advice payload, shared by `POST /advice` and the `/ws` session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceResponse {
    pub advice: String,
}

impl From<Advice> for AdviceResponse {
    fn from(advice: Advice) -> Self {
        Self {
            advice: advice.message().to_string(),
        }
    }
}

/// Client error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
