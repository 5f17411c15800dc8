//! Ledger Endpoints
//!
//! 상태 전이 및 이율 관리
//!
//! 금액은 암호화 입력으로 들어와 ciphertext handle로 나감 → 평문 없음
//!
//! # Design Decision
//!
//! 모든 POST는 `Signed<T>` extractor를 거침
//! - 호출자 = 서명에서 복구한 주소 (본문에 caller 필드 없음)
//! - 암호화 입력의 submitter 바인딩과 합쳐져, 타인의 입력 재사용도 차단

use axum::{extract::State, Json};
use confidential_lending_ledger::{Address, EncryptedInput, MAX_INTEREST_RATE_BPS};
use serde::{Deserialize, Serialize};

use crate::{auth::Signed, error::ApiError, AppState};

// ============ Request/Response Types ============

/// 예치 / 대출 / 상환 요청
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub input: EncryptedInput,
}

/// 예치 응답: 새 예치 잔고 handle
#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub account: String,
    pub deposit: String,
}

/// 대출 / 상환 응답: 실제 실행된 금액 handle + 새 부채 handle
#[derive(Debug, Serialize)]
pub struct ExecutedResponse {
    pub account: String,
    pub executed: String,
    pub debt: String,
}

/// 이자 적용 요청 (대상 계정)
#[derive(Debug, Deserialize)]
pub struct AccrueRequest {
    pub target: Address,
}

#[derive(Debug, Serialize)]
pub struct AccrueResponse {
    pub account: String,
    pub debt: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRateRequest {
    pub interest_rate_bps: u64,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub interest_rate_bps: u64,
    pub max_interest_rate_bps: u64,
}

// ============ Handlers ============

/// POST /ledger/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<AmountRequest>,
) -> Result<Json<DepositResponse>, ApiError> {
    let deposit = state.ledger.deposit(&signer, &body.input).await?;

    Ok(Json(DepositResponse {
        account: signer.to_string(),
        deposit: deposit.handle().to_string(),
    }))
}

/// POST /ledger/borrow
///
/// 항상 200 + `executed` handle 반환
///
/// 한도 초과는 에러가 아님 → `executed`가 0으로 복호화될 뿐
/// (성공 여부가 응답 형태로 드러나지 않음)
pub async fn borrow(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<AmountRequest>,
) -> Result<Json<ExecutedResponse>, ApiError> {
    let outcome = state.ledger.borrow(&signer, &body.input).await?;

    Ok(Json(ExecutedResponse {
        account: signer.to_string(),
        executed: outcome.executed.handle().to_string(),
        debt: outcome.debt.handle().to_string(),
    }))
}

/// POST /ledger/repay
pub async fn repay(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<AmountRequest>,
) -> Result<Json<ExecutedResponse>, ApiError> {
    let outcome = state.ledger.repay(&signer, &body.input).await?;

    Ok(Json(ExecutedResponse {
        account: signer.to_string(),
        executed: outcome.executed.handle().to_string(),
        debt: outcome.debt.handle().to_string(),
    }))
}

/// POST /ledger/accrue (owner 전용)
pub async fn accrue_interest(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<AccrueRequest>,
) -> Result<Json<AccrueResponse>, ApiError> {
    let debt = state.ledger.accrue_interest(&signer, &body.target).await?;

    Ok(Json(AccrueResponse {
        account: body.target.to_string(),
        debt: debt.handle().to_string(),
    }))
}

/// GET /ledger/rate
pub async fn get_rate(State(state): State<AppState>) -> Json<RateResponse> {
    Json(RateResponse {
        interest_rate_bps: state.ledger.interest_rate_bps().await,
        max_interest_rate_bps: MAX_INTEREST_RATE_BPS,
    })
}

/// POST /ledger/rate (owner 전용, 최대 2000 bps)
pub async fn set_rate(
    State(state): State<AppState>,
    Signed { signer, body }: Signed<SetRateRequest>,
) -> Result<Json<RateResponse>, ApiError> {
    state
        .ledger
        .set_interest_rate_bps(&signer, body.interest_rate_bps)
        .await?;

    Ok(Json(RateResponse {
        interest_rate_bps: body.interest_rate_bps,
        max_interest_rate_bps: MAX_INTEREST_RATE_BPS,
    }))
}
