//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 핸들러는 얇게 유지합니다. 요청에서 값을 꺼내고(Extractor),
//! `services::retro`를 호출하고, 결과를 JSON으로 돌려주는 일만 합니다.
//!
//! 각 하위 모듈:
//! - `auth`: 회원가입, 로그인, 내 정보
//! - `templates`: 템플릿 생성/조회/삭제
//! - `sessions`: 세션 생성/조회/삭제, 투표 상위 포스트잇
//! - `postits`: 포스트잇 생성/조회/수정/삭제, 투표
//! - `ws`: 라이브 연결(WebSocket) 업그레이드
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod health;
pub mod postits;
pub mod sessions;
pub mod templates;
pub mod ws;

// 각 모듈의 핸들러 함수들을 재공개하여
// main.rs에서 `routes::list_sessions`처럼 바로 접근 가능하게 합니다.
pub use health::*;
pub use postits::*;
pub use sessions::*;
pub use templates::*;

use sqlx::SqlitePool;

use crate::hub::Hub;

// #[derive(Clone)]: Axum의 State Extractor는 내부적으로 AppState를 clone하므로 필수입니다.
// SqlitePool과 Hub는 모두 내부가 공유 핸들이라 clone해도 같은 풀/허브를 가리킵니다.

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// 라이브 연결 허브 핸들
    pub hub: Hub,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 연결마다 두는 송신 큐 크기
    pub ws_outbound_buffer: usize,
}
