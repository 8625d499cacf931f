//! # 라이브 연결(WebSocket) 라우트
//!
//! ## 엔드포인트
//! - `GET /api/v1/ws`                → 모든 알림을 받는 전역 연결
//! - `GET /api/v1/sessions/{id}/ws`  → 한 세션의 알림(과 전역 알림)만 받는 연결
//!
//! 업그레이드가 끝나면 연결은 `hub::connection::serve`가 맡습니다.
//! 알림에는 내용이 없고 action만 있으므로, 클라이언트는 알림을 받으면
//! 인증된 HTTP API로 보드를 다시 읽습니다.

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    response::Response,
};

use crate::{
    db,
    error::AppError,
    hub::{connection, Scope},
    routes::AppState,
};

pub async fn global_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    upgrade(ws, state, Scope::Global)
}

/// 세션이 없으면 업그레이드하지 않고 404를 돌려줍니다.
pub async fn session_ws(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    db::get_session(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(upgrade(ws, state, Scope::Session(id)))
}

fn upgrade(ws: WebSocketUpgrade, state: AppState, scope: Scope) -> Response {
    let AppState {
        hub,
        ws_outbound_buffer,
        ..
    } = state;

    ws.on_upgrade(move |socket| connection::serve(socket, hub, scope, ws_outbound_buffer))
}
