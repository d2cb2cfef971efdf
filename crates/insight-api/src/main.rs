//! Insight API 서버 진입점.
//!
//! # 환경 변수
//!
//! - `API_HOST`: 바인딩 호스트 (기본값: 127.0.0.1)
//! - `API_PORT`: 바인딩 포트 (기본값: 8000)
//! - `DATABASE_URL`: PostgreSQL 연결 URL
//! - `REDIS_URL`: Redis 연결 URL (미설정 시 인메모리 캐시)
//! - `GEMINI_API_KEY`, `OPENAI_API_KEY`: 생성 provider 키
//! - `TAVILY_API_KEY`: 뉴스 검색 키
//! - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin
//! - `AUTH_DEMO_OTP`: 고정 OTP
//! - `RUST_LOG`, `LOG_FORMAT`: 로그 레벨과 형식
//!
//! `--export-openapi` 플래그(또는 `EXPORT_OPENAPI=1`)를 주면 OpenAPI JSON을 출력하고 종료합니다.

use std::sync::Arc;

use anyhow::Context;
use insight_api::bootstrap::{cors_layer, create_app_state, create_router};
use insight_api::openapi::ApiDoc;
use insight_api::setup_metrics_recorder;
use insight_core::{init_logging, AppConfig, LogConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use utoipa::OpenApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    if handle_export_openapi()? {
        return Ok(());
    }

    init_logging(LogConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Insight API server");

    let metrics_handle = setup_metrics_recorder().context("failed to install metrics recorder")?;
    let config = AppConfig::load().context("failed to load configuration")?;

    let state = Arc::new(create_app_state(&config).await);
    let app = create_router(
        state.clone(),
        metrics_handle,
        cors_layer(&config.cors_origin_list()),
    );

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(address = %addr, "Listening");

    let token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(token.clone()))
        .await
        .context("server error")?;

    token.cancel();
    state.shutdown().await;
    info!("Server stopped gracefully");
    Ok(())
}

/// OpenAPI 내보내기 요청이면 JSON을 출력하고 `true`를 반환합니다.
fn handle_export_openapi() -> anyhow::Result<bool> {
    let requested = std::env::args().any(|arg| arg == "--export-openapi")
        || std::env::var("EXPORT_OPENAPI").is_ok_and(|v| v == "1" || v == "true");
    if !requested {
        return Ok(false);
    }

    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to serialize OpenAPI document")?;
    println!("{}", json);
    Ok(true)
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
        _ = token.cancelled() => {}
    }

    info!("Shutting down");
}
