//! # 서비스(비즈니스 로직) 모듈
//!
//! 라우트 핸들러와 데이터베이스 계층 사이에서 도메인 규칙을 처리합니다.
//!
//! 각 하위 모듈:
//! - `retro`: 템플릿/세션/포스트잇 작업. 소유자 확인 → 저장 → 허브 알림 순서로 처리

pub mod retro;
