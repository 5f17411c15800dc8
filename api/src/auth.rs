//! Request Authentication
//!
//! 상태 변경 및 복호화 요청은 호출자 키로 서명되어야 함
//!
//! # Signed Message (EIP-191 personal_sign)
//!
//! ```text
//! {METHOD} {PATH}\n{TIMESTAMP}\n{BODY}
//! ```
//!
//! - `x-signature`: 65바이트 서명 (hex, `0x` 선택)
//! - `x-timestamp`: unix seconds
//!
//! # Design Decision
//!
//! 호출자 신원은 본문 필드가 아니라 서명에서 복구한 주소로 결정됨
//! - 본문에 다른 주소를 적어 사칭하는 것이 불가능
//! - 본문이 변조되면 다른 주소가 복구됨 → 권한 없는 principal로 처리
//! - 타임스탬프 허용 범위 + 동일 메시지 재사용 차단으로 리플레이 방지
//!
//! 같은 초에 같은 본문을 두 번 보내면 두 번째 요청은 리플레이로 거부됨

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use axum::{
    async_trait,
    body::to_bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
};
use chrono::Utc;
use confidential_lending_ledger::Address;
use ethers::types::{Signature, H256};
use ethers::utils::hash_message;
use serde::de::DeserializeOwned;

use crate::{error::ApiError, AppState};

/// 서명 헤더
pub const SIGNATURE_HEADER: &str = "x-signature";
/// 타임스탬프 헤더
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

/// 서명 대상 본문 최대 크기
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 클라이언트가 서명하는 메시지 구성
pub fn signing_message(method: &str, path: &str, timestamp: i64, body: &[u8]) -> Vec<u8> {
    let mut message = format!("{} {}\n{}\n", method, path, timestamp).into_bytes();
    message.extend_from_slice(body);
    message
}

/// 서명 검증 + 리플레이 차단
pub struct RequestAuthenticator {
    max_age_secs: i64,
    /// (signer, message hash) → timestamp
    seen: Mutex<HashMap<(Address, H256), i64>>,
}

impl RequestAuthenticator {
    pub fn new(max_age_secs: u64) -> Self {
        Self {
            max_age_secs: i64::try_from(max_age_secs).unwrap_or(i64::MAX),
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// 요청 서명을 검증하고 서명자 주소를 반환
    ///
    /// 헤더 누락, 잘못된 서명, 허용 범위를 벗어난 타임스탬프, 재사용된
    /// 메시지는 모두 `ApiError::Unauthorized`
    pub fn authenticate(
        &self,
        method: &str,
        path: &str,
        headers: &HeaderMap,
        body: &[u8],
        now: i64,
    ) -> Result<Address, ApiError> {
        let timestamp: i64 = header(headers, TIMESTAMP_HEADER)?
            .parse()
            .map_err(|_| reject("malformed timestamp"))?;
        if now.abs_diff(timestamp) > self.max_age_secs.unsigned_abs() {
            return Err(reject("timestamp outside the accepted window"));
        }

        let signature = Signature::from_str(header(headers, SIGNATURE_HEADER)?)
            .map_err(|_| reject("malformed signature"))?;

        let digest = hash_message(signing_message(method, path, timestamp, body));
        let signer = signature
            .recover(digest)
            .map(|recovered| Address::new(recovered.0))
            .map_err(|_| reject("signature recovery failed"))?;

        self.remember(signer, digest, timestamp, now)?;
        tracing::debug!(%signer, method, path, "request authenticated");
        Ok(signer)
    }

    fn remember(
        &self,
        signer: Address,
        digest: H256,
        timestamp: i64,
        now: i64,
    ) -> Result<(), ApiError> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);

        // 허용 범위를 벗어난 항목은 어차피 거부되므로 정리
        let max_age = self.max_age_secs.unsigned_abs();
        seen.retain(|_, ts| now.abs_diff(*ts) <= max_age);

        if seen.insert((signer, digest), timestamp).is_some() {
            tracing::warn!(%signer, "replayed request rejected");
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| reject("missing authentication header"))
}

fn reject(reason: &str) -> ApiError {
    tracing::warn!(reason, "request authentication failed");
    ApiError::Unauthorized
}

/// 서명 검증을 통과한 JSON 요청
///
/// `signer`가 곧 호출자 (caller / principal)
pub struct Signed<T> {
    pub signer: Address,
    pub body: T,
}

#[async_trait]
impl<T> FromRequest<AppState> for Signed<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|_| ApiError::ValidationError("Request body too large".to_string()))?;

        let signer = state.auth.authenticate(
            parts.method.as_str(),
            parts.uri.path(),
            &parts.headers,
            &bytes,
            Utc::now().timestamp(),
        )?;

        let body = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::ValidationError(format!("Invalid JSON body: {}", e)))?;

        Ok(Self { signer, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ethers::signers::{LocalWallet, Signer};

    const NOW: i64 = 1_760_000_000;

    fn wallet() -> LocalWallet {
        LocalWallet::from_bytes(&[0x11; 32]).unwrap()
    }

    async fn signed_headers(wallet: &LocalWallet, path: &str, body: &[u8], ts: i64) -> HeaderMap {
        let message = signing_message("POST", path, ts, body);
        let signature = wallet.sign_message(&message).await.unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&signature.to_string()).unwrap(),
        );
        headers.insert(
            TIMESTAMP_HEADER,
            HeaderValue::from_str(&ts.to_string()).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_recovers_signer() {
        let auth = RequestAuthenticator::new(300);
        let wallet = wallet();
        let headers = signed_headers(&wallet, "/decrypt", b"{}", NOW).await;

        let signer = auth
            .authenticate("POST", "/decrypt", &headers, b"{}", NOW + 10)
            .unwrap();
        assert_eq!(signer, Address::new(wallet.address().0));
    }

    #[tokio::test]
    async fn test_missing_headers_rejected() {
        let auth = RequestAuthenticator::new(300);
        let result = auth.authenticate("POST", "/decrypt", &HeaderMap::new(), b"{}", NOW);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_stale_timestamp_rejected() {
        let auth = RequestAuthenticator::new(300);
        let headers = signed_headers(&wallet(), "/decrypt", b"{}", NOW - 301).await;

        let result = auth.authenticate("POST", "/decrypt", &headers, b"{}", NOW);
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_replay_rejected() {
        let auth = RequestAuthenticator::new(300);
        let headers = signed_headers(&wallet(), "/ledger/borrow", b"{}", NOW).await;

        assert!(auth
            .authenticate("POST", "/ledger/borrow", &headers, b"{}", NOW)
            .is_ok());
        let replay = auth.authenticate("POST", "/ledger/borrow", &headers, b"{}", NOW + 1);
        assert!(matches!(replay, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_altered_body_does_not_recover_signer() {
        let auth = RequestAuthenticator::new(300);
        let wallet = wallet();
        let headers = signed_headers(&wallet, "/decrypt", b"{\"a\":1}", NOW).await;

        // 변조된 본문 → 다른 주소 복구 (또는 복구 실패)
        let result = auth.authenticate("POST", "/decrypt", &headers, b"{\"a\":2}", NOW);
        if let Ok(signer) = result {
            assert_ne!(signer, Address::new(wallet.address().0));
        }
    }

    #[test]
    fn test_signing_message_layout() {
        let message = signing_message("POST", "/ledger/rate", 42, b"{}");
        assert_eq!(message, b"POST /ledger/rate\n42\n{}".to_vec());
    }
}
