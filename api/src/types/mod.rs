//! Common Types Module
//!
//! 파싱 helper 및 공통 응답 형태

use confidential_lending_ledger::{Address, Handle};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// 목록 엔드포인트 최대 페이지 크기
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 경로/본문 주소 파싱 (실패 시 validation 에러)
pub fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::ValidationError("Invalid address".to_string()))
}

/// ciphertext handle 파싱
pub fn parse_handle(raw: &str) -> Result<Handle, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::ValidationError("Invalid handle".to_string()))
}

/// 10진수 문자열 평문 금액 파싱
pub fn parse_amount(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::ValidationError("Invalid amount".to_string()))
}

/// 페이지 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// 페이지 (0부터 시작)
    pub page: Option<u32>,
    /// 페이지 크기 (기본값: 20, 최대: 100)
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn resolve(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(0);
        let limit = self.limit.unwrap_or(20).clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let seen = (u64::from(page) + 1) * u64::from(limit);
        Self {
            page,
            limit,
            total,
            has_next: seen < total,
        }
    }
}
