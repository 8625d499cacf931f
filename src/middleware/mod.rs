//! # 미들웨어 / 요청 추출기
//!
//! - `auth`: JWT 검증과 `AuthUser` 추출기

pub mod auth;
