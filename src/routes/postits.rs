//! # 포스트잇 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /api/v1/postits`           → 질문에 포스트잇 붙이기
//! - `GET    /api/v1/postits/{id}`      → 단일 포스트잇 (비공개면 가림)
//! - `PUT    /api/v1/postits/{id}`      → 내용/공개 여부 수정 (작성자만)
//! - `DELETE /api/v1/postits/{id}`      → 삭제 (작성자만)
//! - `POST   /api/v1/postits/{id}/vote` → 투표 (누구나, 횟수 제한 없음)

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

pub async fn create_postit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreatePostitRequest>,
) -> Result<Json<Postit>, AppError> {
    let postit = retro::create_postit(&state.pool, &state.hub, auth_user.user_id, &req).await?;
    Ok(Json(postit))
}

pub async fn get_postit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Postit>, AppError> {
    let postit = retro::get_postit(&state.pool, id, auth_user.user_id).await?;
    Ok(Json(postit))
}

pub async fn update_postit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostitRequest>,
) -> Result<Json<Postit>, AppError> {
    let postit = retro::update_postit(&state.pool, &state.hub, id, auth_user.user_id, &req).await?;
    Ok(Json(postit))
}

pub async fn delete_postit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    retro::delete_postit(&state.pool, &state.hub, id, auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 투표 후의 포스트잇을 돌려줍니다 (`votes`가 1 늘어난 값).
pub async fn vote_postit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Postit>, AppError> {
    let postit = retro::vote_postit(&state.pool, &state.hub, id, auth_user.user_id).await?;
    Ok(Json(postit))
}
