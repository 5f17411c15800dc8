//! Configuration Module
//!
//! 환경변수 기반 설정 (`.env` 지원)
//!
//! 모든 값은 로딩 시점에 검증됨 → 잘못된 값은 첫 요청이 아니라 시작 시 실패
//!
//! # Interview Q&A
//!
//! Q: 왜 `from_lookup`을 따로 두는가?
//! A: 테스트가 프로세스 환경변수를 건드리지 않도록
//!    - `from_env`는 `env::var`를 넘기는 얇은 wrapper
//!    - 테스트는 HashMap 기반 closure로 임의의 환경을 구성

use std::env;

use anyhow::{bail, Context, Result};
use confidential_lending_ledger::{validation, Address, LedgerConfig};

/// 개발용 기본 원장 주소
const DEV_LEDGER_ADDRESS: &str = "0x00000000000000000000000000000000001ed9e5";
/// 개발용 기본 owner
const DEV_LEDGER_OWNER: &str = "0x00000000000000000000000000000000000000e1";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트 (기본값: 3001)
    pub port: u16,

    /// 암호화 입력이 바인딩되어야 하는 원장 주소
    pub ledger_address: Address,

    /// 이자 적용 및 이율 변경 권한을 가진 principal
    pub ledger_owner: Address,

    /// 초기 이율 (bps, 기본값: 100, 최대: 2000)
    pub interest_rate_bps: u64,

    /// 서명 타임스탬프 허용 범위 (초, 기본값: 300)
    pub signature_max_age_secs: u64,

    /// 프로덕션 CORS 허용 origin
    pub allowed_origins: Vec<String>,

    /// 실행 환경 (development, staging, production)
    pub environment: Environment,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Config {
    /// 환경변수에서 설정 로드
    ///
    /// # Environment Variables
    ///
    /// - `PORT`: 서버 포트 (기본값: 3001)
    /// - `ENVIRONMENT`: development | staging | production
    /// - `LEDGER_ADDRESS`: 원장 주소 (프로덕션 필수)
    /// - `LEDGER_OWNER`: owner principal (프로덕션 필수)
    /// - `INTEREST_RATE_BPS`: 초기 이율 (기본값: 100)
    /// - `SIGNATURE_MAX_AGE_SECS`: 서명 허용 범위 (기본값: 300)
    /// - `ALLOWED_ORIGINS`: 쉼표로 구분된 CORS origin
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 임의의 key → value 조회 함수로 설정 로드
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let environment = match var("ENVIRONMENT", "development").to_lowercase().as_str() {
            "production" => Environment::Production,
            "staging" => Environment::Staging,
            _ => Environment::Development,
        };
        let production = environment == Environment::Production;

        let interest_rate_bps = var("INTEREST_RATE_BPS", "100")
            .parse()
            .context("INTEREST_RATE_BPS must be a valid number")?;
        validation::validate_interest_rate(interest_rate_bps)
            .context("INTEREST_RATE_BPS out of range")?;

        let signature_max_age_secs = var("SIGNATURE_MAX_AGE_SECS", "300")
            .parse()
            .context("SIGNATURE_MAX_AGE_SECS must be a valid number")?;

        Ok(Config {
            port: var("PORT", "3001")
                .parse()
                .context("PORT must be a valid number")?,

            ledger_address: address_var(
                &lookup,
                "LEDGER_ADDRESS",
                DEV_LEDGER_ADDRESS,
                production,
            )?,

            ledger_owner: address_var(&lookup, "LEDGER_OWNER", DEV_LEDGER_OWNER, production)?,

            interest_rate_bps,

            signature_max_age_secs,

            allowed_origins: var("ALLOWED_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),

            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            address: self.ledger_address,
            owner: self.ledger_owner,
            interest_rate_bps: self.interest_rate_bps,
        }
    }
}

/// 주소 변수 읽기 (개발 기본값은 프로덕션 외에서만 허용)
fn address_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    dev_default: &str,
    production: bool,
) -> Result<Address> {
    let raw = match lookup(name) {
        Some(value) => value,
        None if production => bail!("{} is required in production", name),
        None => dev_default.to_string(),
    };
    raw.parse()
        .with_context(|| format!("{} must be a 0x-prefixed 20-byte hex address", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 3001);
        assert_eq!(config.interest_rate_bps, 100);
        assert_eq!(config.signature_max_age_secs, 300);
        assert_eq!(config.ledger_address.to_string(), DEV_LEDGER_ADDRESS);
        assert_eq!(config.ledger_owner.to_string(), DEV_LEDGER_OWNER);
        assert!(config.allowed_origins.is_empty());
    }

    #[test]
    fn test_production_requires_addresses() {
        let result = load(&[("ENVIRONMENT", "production")]);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("LEDGER_ADDRESS is required in production"));

        let config = load(&[
            ("ENVIRONMENT", "Production"),
            ("LEDGER_ADDRESS", "0x00000000000000000000000000000000000000aa"),
            ("LEDGER_OWNER", "0x00000000000000000000000000000000000000bb"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.ledger_config().owner, Address::from_low_u64(0xbb));
    }

    #[test]
    fn test_out_of_range_rate_rejected() {
        assert!(load(&[("INTEREST_RATE_BPS", "2001")]).is_err());
        assert!(load(&[("INTEREST_RATE_BPS", "abc")]).is_err());
        assert_eq!(
            load(&[("INTEREST_RATE_BPS", "2000")]).unwrap().interest_rate_bps,
            2000
        );
    }

    #[test]
    fn test_malformed_address_rejected() {
        let result = load(&[("LEDGER_OWNER", "0x1234")]);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("LEDGER_OWNER must be a 0x-prefixed"));
    }

    #[test]
    fn test_allowed_origins_parsed() {
        let config = load(&[
            ("ALLOWED_ORIGINS", " https://a.example , ,https://b.example"),
            ("SIGNATURE_MAX_AGE_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert_eq!(config.signature_max_age_secs, 60);
    }
}
