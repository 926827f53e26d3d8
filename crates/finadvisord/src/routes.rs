//! API routes for finadvisord

use crate::error::ApiError;
use crate::server::AppState;
use crate::session;
use axum::{
    extract::{rejection::FormRejection, State},
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use finadvisor_common::{evaluate, AdviceResponse, FinancialProfile, HealthResponse};
use std::sync::Arc;
use tracing::{debug, warn};

type AppStateArc = Arc<AppState>;

/// Input form served at `/`
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <title>AI Personal Finance Advisor</title>
    </head>
    <body>
        <h1>AI Personal Finance Advisor</h1>
        <form action="/advice" method="post">
            <label for="income">Monthly Income:</label><br>
            <input type="number" step="any" id="income" name="income" required><br>
            <label for="expenses">Monthly Expenses:</label><br>
            <input type="number" step="any" id="expenses" name="expenses" required><br>
            <label for="savings">Current Savings:</label><br>
            <input type="number" step="any" id="savings" name="savings" required><br>
            <label for="debt">Current Debt:</label><br>
            <input type="number" step="any" id="debt" name="debt" required><br>
            <input type="submit" value="Get Advice">
        </form>
    </body>
</html>
"#;

// ============================================================================
// Page Routes
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(index))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// ============================================================================
// Advice Routes
// ============================================================================

pub fn advice_routes() -> Router<AppStateArc> {
    Router::new().route("/advice", post(advice))
}

async fn advice(
    form: Result<Form<FinancialProfile>, FormRejection>,
) -> Result<Json<AdviceResponse>, ApiError> {
    let Form(profile) = form.map_err(|rejection| {
        warn!("  Rejected advice form: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    profile.validate().map_err(|e| {
        warn!("  Rejected advice profile: {}", e);
        ApiError::from(e)
    })?;

    let advice = evaluate(&profile);
    debug!(?advice, "Advice evaluated");

    Ok(Json(advice.into()))
}

// ============================================================================
// Session Routes
// ============================================================================

pub fn session_routes() -> Router<AppStateArc> {
    Router::new().route("/ws", get(session::ws_handler))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
