//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)와 도메인 규칙을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `template`: 재사용 가능한 질문 템플릿
//! - `session`: 템플릿에서 만들어진 회고 세션과 그 질문(Question)
//! - `postit`: 질문에 붙는 참가자 메모, 가시성 가림(redaction)과 투표 순위 규칙
//! - `user`: 사용자(User) 관련 구조체
//!
//! DB 접근은 `db` 모듈이 담당하고, 여기의 규칙들은 순수 함수라서
//! 저장소 없이도 테스트할 수 있습니다.

pub mod postit;
pub mod session;
pub mod template;
pub mod user;

pub use postit::*;
pub use session::*;
pub use template::*;

use crate::error::AppError;

/// 사용자가 입력한 이름을 다듬고, 비어 있으면 Validation 에러를 돌려줍니다.
///
/// 템플릿 이름, 세션 이름, 질문 문구 검증에 같이 씁니다.
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
