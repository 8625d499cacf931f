//! # 회고 세션 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/sessions | `list_sessions` | 세션 목록 |
//! | POST | /api/v1/sessions | `create_session` | 템플릿으로 새 세션 시작 |
//! | GET | /api/v1/sessions/{id} | `get_session` | 질문·포스트잇 포함 조회 (비공개 글은 가림) |
//! | DELETE | /api/v1/sessions/{id} | `delete_session` | 세션 삭제 (소유자만) |
//! | GET | /api/v1/sessions/{id}/top?n=3 | `top_session_postits` | 투표 상위 포스트잇 |
//!
//! ## 세션 사용 흐름
//! ```text
//! 1. 진행자: POST /sessions { template_id, name }
//! 2. 참가자: GET /sessions/{id}/ws 로 라이브 연결
//! 3. 참가자: POST /postits, POST /postits/{id}/vote ...
//! 4. 알림을 받을 때마다 GET /sessions/{id} 로 보드를 다시 읽음
//! 5. 마무리: GET /sessions/{id}/top?n=3
//! ```

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::retro,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /api/v1/sessions` → `{ "sessions": [...] }` (최신 세션 먼저)
pub async fn list_sessions(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let sessions = retro::list_sessions(&state.pool).await?;
    Ok(Json(json!({ "sessions": sessions })))
}

/// `POST /api/v1/sessions` + `{ "template_id": 1, "name": "Sprint 12" }`
///
/// 템플릿이 없으면 404, 이름이 비어 있으면 422.
pub async fn create_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<Session>, AppError> {
    let session = retro::create_session(&state.pool, &state.hub, auth_user.user_id, &req).await?;
    Ok(Json(session))
}

pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Session>, AppError> {
    let session = retro::get_session(&state.pool, id, auth_user.user_id).await?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    retro::delete_session(&state.pool, &state.hub, id, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/v1/sessions/{id}/top?n=5` → `{ "postits": [...] }`
///
/// `n`을 생략하면 3개.
pub async fn top_session_postits(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Query(query): Query<TopPostitsQuery>,
) -> Result<Json<Value>, AppError> {
    let postits = retro::top_voted_postits(&state.pool, id, query.n(), auth_user.user_id).await?;
    Ok(Json(json!({ "postits": postits })))
}
