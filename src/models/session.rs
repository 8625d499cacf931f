//! # 회고 세션 모델 정의
//!
//! 세션은 템플릿 하나로부터 만들어지는 "진행 중인 회고"입니다.
//!
//! ## 구조
//! ```text
//! Session ─┬─ Question ─┬─ Postit
//!          │            └─ Postit
//!          └─ Question ─── Postit
//! ```
//!
//! 세션의 질문은 템플릿 질문을 참조하지 않고 복사한 독립된 행입니다.
//! 그래서 템플릿이 바뀌거나 삭제돼도 이미 만들어진 세션은 영향을 받지 않습니다.
//! Question은 자기 소유자가 없고, 부모 세션의 소유자를 따릅니다.

use serde::{Deserialize, Serialize};

use super::{require_text, Postit};
use crate::error::AppError;

/// 세션 엔티티: DB의 `sessions` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub name: String,
    /// 세션을 만든 사용자 (진행자, 소유자)
    pub user_id: i64,
    pub created_at: String,
    /// 질문 목록. `db::get_session_with_children`에서 채웁니다.
    #[sqlx(skip)]
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// 세션 안의 질문 하나
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub session_id: i64,
    pub position: i64,
    pub content: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub postits: Vec<Postit>,
}

impl Session {
    /// `viewer`가 볼 수 있는 형태로 세션을 가립니다.
    ///
    /// 비공개(`is_visible == false`)이면서 작성자가 아닌 포스트잇은
    /// 내용만 자리표시자로 바뀌고, id/작성자/투표 수는 그대로 남습니다.
    /// 저장소의 원본은 건드리지 않습니다 (읽을 때마다 새로 가림).
    pub fn redacted_for(mut self, viewer: i64) -> Self {
        for question in &mut self.questions {
            for postit in &mut question.postits {
                postit.redact_for(viewer);
            }
        }
        self
    }
}

/// 세션 생성 요청: `POST /api/v1/sessions`
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub template_id: i64,
    pub name: String,
}

impl CreateSessionRequest {
    /// 세션 이름을 검증하고 다듬은 값을 돌려줍니다.
    pub fn validated_name(&self) -> Result<String, AppError> {
        require_text("name", &self.name)
    }
}

/// `GET /api/v1/sessions/{id}/top?n=5`
#[derive(Debug, Deserialize)]
pub struct TopPostitsQuery {
    pub n: Option<usize>,
}

impl TopPostitsQuery {
    pub const DEFAULT_N: usize = 3;

    pub fn n(&self) -> usize {
        self.n.unwrap_or(Self::DEFAULT_N)
    }
}
