//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 도메인 에러(NotFound/Forbidden/Validation)와
//!   저장소 에러(Database)를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 라이브 연결(WebSocket)에서 생기는 전송 에러는 여기에 없습니다.
//! 그 에러는 `hub::HubError`로 허브 내부에서만 처리되고 요청 처리에는 전파되지 않습니다.

use axum::{
    http::StatusCode,                     // HTTP 상태 코드 (200, 404, 500 등)
    response::{IntoResponse, Response},   // Axum의 응답 변환 트레이트
    Json,                                 // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로: JSON 객체를 간편하게 생성
use thiserror::Error; // thiserror: 커스텀 에러 타입을 쉽게 만들어주는 매크로 크레이트

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 서비스 계층은 `Result<T, AppError>`를 반환하고, 호출하는 쪽은
/// 문자열 비교가 아니라 `match`로 variant를 구분합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 템플릿/세션/포스트잇을 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 소유자가 아닌 사용자의 접근 (HTTP 403)
    #[error("Not the owner of this object")]
    Forbidden,

    /// 생성 요청 입력값이 잘못됨 (HTTP 422)
    /// 예: 빈 이름, 빈 질문 목록
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error를 AppError로 자동 변환하는 From 트레이트를 구현합니다.
    /// sqlx 함수 호출 뒤에 `?`를 쓰면 자동으로 AppError::Database가 됩니다.
    /// 트랜잭션 안에서 발생하면 트랜잭션이 롤백되므로 부분 상태가 남지 않습니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// 응답 본문의 `error.code` 값
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "not_found",
            AppError::Forbidden => "forbidden",
            AppError::Validation(_) => "validation_failed",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Conflict(_) => "conflict",
            AppError::Internal(_) => "internal_error",
            AppError::Database(_) => "database_error",
        }
    }

    /// HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    /// 인가(403)/없음(404) 에러는 클라이언트가 구분해서 반응할 수 있도록
    /// 고유한 코드로 내려갑니다.
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            AppError::Internal(ref msg) => {
                // 내부 에러는 로그에 기록 (서버 관리자용)
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::Validation(ref msg)
            | AppError::Unauthorized(ref msg)
            | AppError::Conflict(ref msg) => msg.clone(),
            AppError::NotFound | AppError::Forbidden => self.to_string(),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
