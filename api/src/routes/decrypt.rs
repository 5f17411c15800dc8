//! Decryption Endpoint
//!
//! gateway를 통한 복호화
//!
//! 원장이 해당 handle에 권한을 부여한 principal만 평문을 받음
//! (principal = 요청 서명자)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{auth::Signed, error::ApiError, types::parse_handle, AppState};

/// 복호화 요청
#[derive(Debug, Deserialize)]
pub struct DecryptRequest {
    pub handle: String,
}

/// 복호화 응답
#[derive(Debug, Serialize)]
pub struct DecryptResponse {
    pub handle: String,
    /// 평문 (10진수 문자열)
    pub value: String,
}

/// POST /decrypt
pub async fn decrypt(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<DecryptRequest>,
) -> Result<Json<DecryptResponse>, ApiError> {
    let handle = parse_handle(&body.handle)?;
    let value = state.ledger.decrypt(handle, &signer)?;

    Ok(Json(DecryptResponse {
        handle: handle.to_string(),
        value: value.to_string(),
    }))
}
