use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{any, get};
use axum::{Router, serve};
use bridge_core::ModuleRegistry;
use tokio::net::TcpListener;

use crate::adapter;
use crate::health::{self, HealthState};

pub struct HostServer {
    addr: SocketAddr,
    router: Router,
}

impl HostServer {
    pub fn new(port: u16, registry: ModuleRegistry) -> Self {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!(functions = ?registry.names(), "registered legacy functions");
        Self {
            addr,
            router: router(ServerState::new(registry)),
        }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!(addr = %self.addr, "starting bridge host");
        let listener = TcpListener::bind(self.addr).await?;
        serve(listener, self.router).await?;
        Ok(())
    }
}

/// Route table: every registered module under `/api/netlify/{name}`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/netlify/{name}", any(adapter::dispatch))
        .route("/api/netlify/{name}/{*rest}", any(adapter::dispatch))
        .route("/healthz", get(health::handler))
        .with_state(state)
}

#[derive(Clone)]
pub struct ServerState {
    pub registry: Arc<ModuleRegistry>,
    pub health: Arc<HealthState>,
}

impl ServerState {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            health: Arc::new(HealthState::new()),
        }
    }
}
