use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use bridge_core::BridgeError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::server::ServerState;

pub struct HealthState {
    started_at: OffsetDateTime,
    failures: AtomicU64,
    last_error: parking_lot::Mutex<Option<String>>,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: OffsetDateTime::now_utc(),
            failures: AtomicU64::new(0),
            last_error: parking_lot::Mutex::new(None),
        }
    }

    pub fn record_failure(&self, err: &BridgeError) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        *self.last_error.lock() = Some(err.to_string());
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            started_at: self.started_at,
            failures: self.failures.load(Ordering::SeqCst),
            last_error: self.last_error.lock().clone(),
        }
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HealthSnapshot {
    pub started_at: OffsetDateTime,
    pub failures: u64,
    pub last_error: Option<String>,
}

pub async fn handler(State(state): State<ServerState>) -> impl IntoResponse {
    let snapshot = state.health.snapshot();
    let functions = state.registry.len();
    let status = if functions > 0 { "ok" } else { "degraded" };
    let started_at = snapshot.started_at.format(&Rfc3339).ok();
    Json(serde_json::json!({
        "status": status,
        "functions": functions,
        "started_at": started_at,
        "failures": snapshot.failures,
        "last_error": snapshot.last_error,
    }))
}
