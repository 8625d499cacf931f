//! # 템플릿 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/templates`      → 템플릿 목록 (질문 포함)
//! - `POST   /api/v1/templates`      → 새 템플릿 생성
//! - `GET    /api/v1/templates/{id}` → 단일 템플릿 조회 (소유자만)
//! - `DELETE /api/v1/templates/{id}` → 템플릿 삭제 (소유자만)

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::retro,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /templates` → `{ "templates": [...] }`
pub async fn list_templates(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let templates = retro::list_templates(&state.pool).await?;
    Ok(Json(json!({ "templates": templates })))
}

/// `POST /templates` + `{ "name": "Sprint 12", "questions": ["Good?", "Bad?"] }`
pub async fn create_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<Json<Template>, AppError> {
    let template = retro::create_template(&state.pool, &state.hub, auth_user.user_id, &req).await?;
    Ok(Json(template))
}

pub async fn get_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Template>, AppError> {
    let template = retro::get_template(&state.pool, id, auth_user.user_id).await?;
    Ok(Json(template))
}

/// 성공하면 204 No Content
pub async fn delete_template(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    retro::delete_template(&state.pool, &state.hub, id, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
