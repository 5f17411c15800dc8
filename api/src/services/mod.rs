//! Services Module
//!
//! 라우트와 원장 사이의 비즈니스 레이어
//!
//! # Services
//! - `LedgerService`: 원장 연산, 복호화, 입력 암호화 helper
//! - `EventHistory`: 타임스탬프 이벤트 피드

mod event_history;
mod ledger_service;

pub use event_history::{EventHistory, EventRecord};
pub use ledger_service::{Executed, LedgerService, LedgerStatus};
