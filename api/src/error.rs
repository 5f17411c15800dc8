//! Error Handling Module
//!
//! 원장 에러를 HTTP 상태 코드로 매핑
//!
//! 내부 실패는 tracing으로 기록하고 클라이언트에는 상세 없이 반환

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use confidential_lending_ledger::LedgerError;
use serde::Serialize;
use thiserror::Error;

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 클라이언트 에러: 4xx (잘못된 입력, 서명 누락, owner 아님, 증명 실패)
/// - 서버 에러: 5xx (executor 실패)
///
/// 인증 실패 사유는 로그에만 남기고 응답에는 포함하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ============ 401 Unauthorized ============
    #[error("Authentication required")]
    Unauthorized,

    // ============ 403 Forbidden ============
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ============ 422 Unprocessable Entity ============
    #[error("Invalid encrypted input: {0}")]
    InvalidInput(String),

    // ============ 500 Internal Server Error ============
    #[error("Internal server error")]
    InternalError,
}

/// 에러 응답 본문
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            ApiError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(msg.clone()),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                msg.clone(),
                None,
            ),
            ApiError::InvalidInput(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_INPUT",
                "Encrypted input rejected".to_string(),
                Some(msg.clone()),
            ),
            // 5xx: 내부 정보 숨김
            ApiError::InternalError => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Unauthorized { .. } | LedgerError::NotAuthorized { .. } => {
                ApiError::Forbidden(err.to_string())
            }
            LedgerError::RateOutOfRange { .. } => ApiError::ValidationError(err.to_string()),
            LedgerError::ProofVerification(reason) => ApiError::InvalidInput(reason),
            LedgerError::Fhe(inner) => {
                tracing::error!("Executor error: {:?}", inner);
                ApiError::InternalError
            }
        }
    }
}
