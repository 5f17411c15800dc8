//! Confidential Lending API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │             Client (encrypts inputs, decrypts handles)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /ledger/*  /position/*  /decrypt  /events     ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │          Signed<T> extractor (EIP-191 recovery)          ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │  LedgerService    EventHistory                          ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │      ConfidentialLedger ── coprocessor ── ACL ── gateway     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use confidential_lending_api::{create_router, AppState, Config};

/// RUST_LOG 미설정 시 기본 필터
const DEFAULT_LOG_FILTER: &str =
    "confidential_lending_api=debug,confidential_lending_ledger=info,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Confidential Lending API Server");

    let config = Config::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        ledger = %config.ledger_address,
        owner = %config.ledger_owner,
        interest_rate_bps = config.interest_rate_bps,
        signature_max_age_secs = config.signature_max_age_secs,
        "configuration loaded"
    );

    let port = config.port;
    let state = AppState::new(config).context("failed to initialise the confidential ledger")?;
    tracing::info!("ledger initialised");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
