//! API Routes Module
//!
//! HTTP 엔드포인트 핸들러
//!
//! # Routes
//! - `/health` - 상태 확인
//! - `/inputs/*` - 암호화 helper (개발 전용)
//! - `/ledger/*` - 예치, 대출, 상환, 이자 적용, 이율 관리 (서명 필요)
//! - `/position/*` - 암호화 포지션 및 계정별 이력
//! - `/decrypt` - ACL 검사 후 복호화 (서명 필요)
//! - `/events` - 원장 이벤트 피드

pub mod decrypt;
pub mod health;
pub mod inputs;
pub mod ledger;
pub mod position;
