//! Confidential Lending API Library
//!
//! # Overview
//!
//! 기밀 대출 원장의 HTTP 인터페이스
//!
//! 금액은 요청에서는 암호화 입력, 응답에서는 ciphertext handle로만 오감
//! 평문은 ACL 검사를 거치는 `/decrypt`로만 돌아옴
//!
//! 호출자 신원은 요청 서명에서 복구 (`auth` 모듈)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────────┐  ┌─────────┐              │
//! │  │ Routes  │──│  Services   │  │  Types  │              │
//! │  └─────────┘  └──────┬──────┘  └─────────┘              │
//! │                      │                                   │
//! └──────────────────────┼───────────────────────────────────┘
//!                        ▼
//!              ┌────────────────────┐
//!              │ confidential ledger │
//!              └────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `auth`: 요청 서명 검증, `Signed<T>` extractor
//! - `config`: 환경 설정
//! - `error`: API 에러 타입 및 상태 코드 매핑
//! - `routes`: HTTP 핸들러
//! - `services`: 원장 서비스, 이벤트 기록
//! - `types`: 파싱 helper, 페이지네이션

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use confidential_lending_ledger::LedgerResult;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use auth::RequestAuthenticator;
pub use config::Config;
pub use error::ApiError;
pub use services::LedgerService;

/// 개발용 origin (Vite 및 대체 포트)
const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
];

/// 애플리케이션 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub auth: Arc<RequestAuthenticator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 설정으로부터 원장과 인증기 구성
    pub fn new(config: Config) -> LedgerResult<Self> {
        let ledger = LedgerService::new(config.ledger_config())?;
        let auth = RequestAuthenticator::new(config.signature_max_age_secs);

        Ok(Self {
            ledger: Arc::new(ledger),
            auth: Arc::new(auth),
            config: Arc::new(config),
        })
    }
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /health                     - 상태 및 공개 파라미터
///
/// POST /inputs/encrypt             - 개발용 암호화 helper
///
/// POST /ledger/deposit             - [서명] 예치 잔고에 암호화 금액 추가
/// POST /ledger/borrow              - [서명] fail-closed 대출
/// POST /ledger/repay               - [서명] min(amount, debt) 상환
/// POST /ledger/accrue              - [서명] 이자 적용 (owner)
/// GET  /ledger/rate                - 현재 이율
/// POST /ledger/rate                - [서명] 이율 변경 (owner, <= 2000 bps)
///
/// GET  /position/:address          - 예치/부채 handle
/// GET  /position/:address/history  - 계정별 이벤트
/// POST /decrypt                    - [서명] ACL 검사 후 복호화
/// GET  /events                     - 전체 이벤트 (페이지네이션)
/// ```
///
/// GET은 handle과 이벤트만 노출하므로 서명 불필요
pub fn create_router(state: AppState) -> Router {
    let cors = if state.config.is_production() {
        // 프로덕션: 설정된 origin만 허용
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([
                header::CONTENT_TYPE,
                HeaderName::from_static(auth::SIGNATURE_HEADER),
                HeaderName::from_static(auth::TIMESTAMP_HEADER),
            ])
    } else {
        let origins: Vec<HeaderValue> = DEV_ORIGINS
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Client helpers
        .route("/inputs/encrypt", post(routes::inputs::encrypt_input))

        // Ledger operations
        .route("/ledger/deposit", post(routes::ledger::deposit))
        .route("/ledger/borrow", post(routes::ledger::borrow))
        .route("/ledger/repay", post(routes::ledger::repay))
        .route("/ledger/accrue", post(routes::ledger::accrue_interest))
        .route(
            "/ledger/rate",
            get(routes::ledger::get_rate).post(routes::ledger::set_rate),
        )

        // Readback
        .route("/position/:address", get(routes::position::get_position))
        .route(
            "/position/:address/history",
            get(routes::position::get_position_history),
        )
        .route("/decrypt", post(routes::decrypt::decrypt))
        .route("/events", get(routes::position::get_events))

        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
