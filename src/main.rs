//! # Retroboard 웹 서버 진입점
//!
//! 회고 보드 서버의 **시작점(entry point)**입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 라이브 연결 허브(코디네이터 태스크) 시작
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

// ── 모듈 선언 ──
// Rust에서는 파일 시스템 구조가 곧 모듈 구조입니다.
mod config;
mod db;
mod error;
mod hub;
mod middleware;
mod models;
mod routes;
mod services;

use std::{path::Path, str::FromStr};

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::{
    routing::{get, post}, // HTTP 메서드별 라우팅 함수들
    Router,
};
use config::Config;
use hub::Hub;
use routes::{AppState, *};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},          // CORS 설정
    services::{ServeDir, ServeFile}, // 정적 파일 서빙 서비스
    trace::TraceLayer,               // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 retroboard, tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retroboard=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Retroboard server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    // create_if_missing: DB 파일이 없으면 새로 만듭니다 (첫 실행).
    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 허브 시작 ──
    // 코디네이터 태스크는 프로세스가 끝날 때까지 돌고,
    // 핸들(Hub)은 clone해서 모든 핸들러가 공유합니다.
    let hub = Hub::spawn();

    let state = AppState {
        pool: pool.clone(),
        hub,
        jwt_secret: config.jwt_secret.clone(),
        ws_outbound_buffer: config.ws_outbound_buffer,
    };

    // ── 7단계: API 라우터 설정 ──
    // axum 0.8부터 경로 파라미터는 `{id}` 문법을 씁니다.
    let user_routes = Router::new()
        .route("/users/signup", post(routes::auth::signup))
        .route("/users/login", post(routes::auth::login))
        .route("/users/me", get(routes::auth::me));

    let api_routes = Router::new()
        .merge(user_routes)
        // 템플릿
        .route("/templates", get(list_templates).post(create_template))
        .route("/templates/{id}", get(get_template).delete(delete_template))
        // 세션
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/top", get(top_session_postits))
        // 포스트잇
        .route("/postits", post(create_postit))
        .route("/postits/{id}", get(get_postit).put(update_postit).delete(delete_postit))
        .route("/postits/{id}/vote", post(vote_postit))
        // 라이브 연결
        .route("/ws", get(routes::ws::global_ws))
        .route("/sessions/{id}/ws", get(routes::ws::session_ws))
        .route("/health", get(health_check))
        .with_state(state);

    // ── 8단계: CORS 미들웨어 설정 ──
    // 개발 환경 기준으로 모두 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 9단계: 프론트엔드 정적 파일 서빙 ──
    // SPA이므로 찾을 수 없는 경로는 index.html로 돌려보냅니다.
    let frontend_dist = Path::new(&config.frontend_dist);
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", config.frontend_dist);

        let serve_dir = ServeDir::new(frontend_dist)
            .not_found_service(ServeFile::new(frontend_dist.join("index.html")));

        Router::new()
            .nest("/api/v1", api_routes)
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");

        Router::new()
            .nest("/api/v1", api_routes)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 10단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
