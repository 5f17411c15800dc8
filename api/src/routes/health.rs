//! Health Check Endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// 헬스 체크 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ledger: LedgerHealth,
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct LedgerHealth {
    pub address: String,
    pub owner: String,
    pub interest_rate_bps: u64,
    pub accounts: usize,
    pub events: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = state.ledger.status().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: LedgerHealth {
            address: status.address.to_string(),
            owner: status.owner.to_string(),
            interest_rate_bps: status.interest_rate_bps,
            accounts: status.accounts,
            events: status.events,
        },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
