//! Input Endpoints
//!
//! 클라이언트 측 암호화를 서버에서 수행하는 개발용 helper
//!
//! # Security Warning
//!
//! 평문이 서버로 전송됨 → 기밀성 무력화
//! - 로컬 테스트 전용, 프로덕션에서는 거부
//! - 실제 클라이언트는 로컬에서 암호화
//!
//! 서명이 필요 없음: 결과 입력은 `submitter`에 바인딩되어, 해당 키로 서명한
//! 요청에서만 원장이 받아들임

use axum::{extract::State, Json};
use confidential_lending_ledger::{Address, EncryptedInput};
use serde::Deserialize;

use crate::{error::ApiError, types::parse_amount, AppState};

#[derive(Debug, Deserialize)]
pub struct EncryptRequest {
    /// 입력을 제출할 principal
    pub submitter: Address,
    /// 평문 금액 (10진수 문자열)
    pub value: String,
}

/// POST /inputs/encrypt
pub async fn encrypt_input(
    State(state): State<AppState>,
    Json(req): Json<EncryptRequest>,
) -> Result<Json<EncryptedInput>, ApiError> {
    if state.config.is_production() {
        return Err(ApiError::Forbidden(
            "server-side encryption is disabled in production".to_string(),
        ));
    }

    let value = parse_amount(&req.value)?;
    tracing::debug!(
        submitter = %req.submitter,
        ledger = %state.ledger.address(),
        "encrypting input"
    );

    Ok(Json(state.ledger.encrypt_input(value, &req.submitter)))
}
