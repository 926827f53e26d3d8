//! HTTP server for finadvisord
//!
//! The server is an owned instance with an explicit lifecycle:
//! [`AdvisorServer::bind`] reserves the listener, [`AdvisorServer::start`]
//! spawns the serve loop, and [`RunningServer::stop`] shuts it down and
//! waits for the serve loop and every open session to finish.

use crate::config::{Config, ServerConfig};
use crate::network::middleware::{body_size_limit, BodyLimit};
use crate::routes;
use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, middleware, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// How long `stop` waits for sessions to send their close frames
const SESSION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across handlers. Read-only after construction.
pub struct AppState {
    pub start_time: Instant,
    /// Flips to `true` when the server is stopping
    pub shutdown: watch::Receiver<bool>,
    /// Cloned into every WebSocket session. The matching receiver sees the
    /// channel close once the router and all sessions are gone.
    pub sessions: mpsc::Sender<()>,
}

impl AppState {
    pub fn new(shutdown: watch::Receiver<bool>, sessions: mpsc::Sender<()>) -> Self {
        Self {
            start_time: Instant::now(),
            shutdown,
            sessions,
        }
    }
}

/// Build the full router with middleware
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::advice_routes())
        .merge(routes::session_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware::from_fn_with_state(
            BodyLimit(config.max_body_bytes),
            body_size_limit,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
}

/// A bound but not yet serving advisor server
pub struct AdvisorServer {
    listener: TcpListener,
    config: Config,
}

impl AdvisorServer {
    /// Bind the configured address
    pub async fn bind(config: Config) -> Result<Self> {
        let addr = config.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read listener address")
    }

    /// Spawn the serve loop
    pub fn start(self) -> Result<RunningServer> {
        let local_addr = self.local_addr()?;
        let Self { listener, config } = self;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (sessions_tx, sessions_rx) = mpsc::channel(1);
        let state = Arc::new(AppState::new(shutdown_rx.clone(), sessions_tx));
        let app = router(state, &config.server);

        let mut signal = shutdown_rx;
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.wait_for(|stopping| *stopping).await;
                })
                .await
        });

        info!("  Listening on http://{}", local_addr);

        Ok(RunningServer {
            local_addr,
            shutdown_tx,
            task,
            sessions: sessions_rx,
        })
    }
}

/// Handle to a serving advisor server
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
    sessions: mpsc::Receiver<()>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal shutdown to the listener and every open session, then wait
    /// for in-flight HTTP requests to finish and for sessions to send their
    /// close frames.
    pub async fn stop(self) -> Result<()> {
        let Self {
            shutdown_tx,
            task,
            mut sessions,
            ..
        } = self;

        // No receivers left means the serve loop already exited
        let _ = shutdown_tx.send(true);
        task.await
            .context("Server task panicked")?
            .context("Server error")?;

        // Nothing is ever sent, so recv only returns once every sender is dropped
        if timeout(SESSION_DRAIN_TIMEOUT, sessions.recv()).await.is_err() {
            warn!(
                "Sessions still open {}s after shutdown",
                SESSION_DRAIN_TIMEOUT.as_secs()
            );
        }
        info!("  Server stopped");
        Ok(())
    }
}
