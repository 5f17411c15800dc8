//! Position Endpoints
//!
//! 암호화 포지션 및 이벤트 이력 조회
//!
//! 포지션은 ciphertext handle로만 반환 → 보유자가 `/decrypt`로 복호화

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::ApiError,
    services::EventRecord,
    types::{parse_address, PageQuery, Pagination},
    AppState,
};

// ============ Request/Response Types ============

/// 포지션 조회 응답
#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub address: String,
    /// 예치 잔고 handle
    pub deposit: String,
    /// 부채 handle
    pub debt: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub events: Vec<EventRecord>,
    pub pagination: Pagination,
}

// ============ Handlers ============

/// GET /position/:address
///
/// 활동 없는 계정은 원장의 공유 zero handle 반환
pub async fn get_position(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PositionResponse>, ApiError> {
    let account = parse_address(&address)?;
    let position = state.ledger.position(&account).await;

    Ok(Json(PositionResponse {
        address: account.to_string(),
        deposit: position.deposit.handle().to_string(),
        debt: position.debt.handle().to_string(),
    }))
}

/// GET /position/:address/history
pub async fn get_position_history(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let account = parse_address(&address)?;
    let (page, limit) = query.resolve();

    let (events, total) = state.ledger.events(Some(&account), page, limit).await;

    Ok(Json(HistoryResponse {
        events,
        pagination: Pagination::new(page, limit, total),
    }))
}

/// GET /events
pub async fn get_events(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<HistoryResponse> {
    let (page, limit) = query.resolve();
    let (events, total) = state.ledger.events(None, page, limit).await;

    Json(HistoryResponse {
        events,
        pagination: Pagination::new(page, limit, total),
    })
}
