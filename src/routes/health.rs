//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok", "live_connections": 3 }`
//!
//! DB에 `SELECT 1`을 보내고, 허브 코디네이터에게 현재 연결 수를 물어봅니다.
//! 둘 중 하나라도 응답하지 않으면 503과 함께 `"status": "degraded"`를 돌려줍니다.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let live_connections = state.hub.connection_count().await.ok();

    let healthy = database_ok && live_connections.is_some();
    let status = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(database_ok, hub_ok = live_connections.is_some(), "health check degraded");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "database": if database_ok { "ok" } else { "unavailable" },
            "live_connections": live_connections,
        })),
    )
}
