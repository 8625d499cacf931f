//! # 템플릿 모델 정의
//!
//! 템플릿은 이름과 "순서가 있는 질문 문구 목록"으로 이루어진 재사용 단위입니다.
//! 세션을 만들 때 질문 문구가 세션 쪽으로 복사되므로,
//! 템플릿은 한 번 만들어지면 질문을 부분 수정하는 API가 없습니다.

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::AppError;

/// 템플릿 엔티티: DB의 `templates` 테이블 한 행에 대응합니다.
///
/// `questions`는 테이블 컬럼이 아니라 `template_questions`에서 따로 채웁니다.
/// `#[sqlx(skip)]`은 FromRow 변환 때 이 필드를 건너뛰고 `Default`(빈 Vec)로 둡니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Template {
    pub id: i64,
    pub name: String,
    /// 템플릿을 만든 사용자 (소유자)
    pub user_id: i64,
    pub created_at: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub questions: Vec<TemplateQuestion>,
}

/// 템플릿에 속한 질문 문구 하나
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TemplateQuestion {
    pub id: i64,
    pub template_id: i64,
    /// 템플릿 안에서의 순서 (0부터)
    pub position: i64,
    pub content: String,
}

/// 템플릿 생성 요청: `POST /api/v1/templates`
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub questions: Vec<String>,
}

/// 검증을 통과한 템플릿 입력값
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    pub questions: Vec<String>,
}

impl CreateTemplateRequest {
    /// 이름과 질문 문구를 다듬고 검증합니다.
    ///
    /// - 이름이 비어 있으면 `Validation`
    /// - 질문 목록이 비어 있거나, 빈 문구가 섞여 있으면 `Validation`
    pub fn validate(&self) -> Result<NewTemplate, AppError> {
        let name = require_text("name", &self.name)?;

        if self.questions.is_empty() {
            return Err(AppError::Validation(
                "questions must contain at least one prompt".to_string(),
            ));
        }

        let questions = self
            .questions
            .iter()
            .map(|prompt| require_text("question", prompt))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewTemplate { name, questions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, questions: &[&str]) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[test]
    fn validate_trims_name_and_prompts() {
        let template = request("  T1 ", &[" Good? ", "Bad?"]).validate().unwrap();
        assert_eq!(template.name, "T1");
        assert_eq!(template.questions, vec!["Good?", "Bad?"]);
    }

    #[test]
    fn validate_rejects_empty_name() {
        assert!(matches!(
            request("   ", &["Good?"]).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_empty_question_list() {
        assert!(matches!(
            request("T1", &[]).validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_prompt() {
        assert!(matches!(
            request("T1", &["Good?", "  "]).validate(),
            Err(AppError::Validation(_))
        ));
    }
}
