//! # 포스트잇 모델 정의
//!
//! 참가자가 질문에 붙이는 메모입니다.
//!
//! ## 규칙
//! - 내용과 공개 여부는 작성자만 바꿀 수 있습니다.
//! - 투표 수는 0에서 시작해 늘어나기만 합니다. 누가 몇 번 투표했는지는 기록하지 않습니다.
//! - 비공개 포스트잇은 작성자가 아닌 사람에게 `NO_CONTENT_PLACEHOLDER`로 보입니다.

use serde::{Deserialize, Serialize};

/// 가려진 포스트잇 내용 대신 내려가는 고정 문자열
pub const NO_CONTENT_PLACEHOLDER: &str = "~~~~~~~~\n~~~~~~~~";

/// 포스트잇 엔티티: DB의 `postits` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Postit {
    pub id: i64,
    /// 작성자
    pub user_id: i64,
    pub question_id: i64,
    pub votes: i64,
    pub content: String,
    /// false면 작성자에게만 내용이 보입니다.
    pub is_visible: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Postit {
    /// `viewer`가 이 포스트잇의 실제 내용을 볼 수 있는지
    pub fn is_readable_by(&self, viewer: i64) -> bool {
        self.is_visible || self.user_id == viewer
    }

    /// 볼 수 없는 viewer라면 내용만 자리표시자로 바꿉니다.
    pub fn redact_for(&mut self, viewer: i64) {
        if !self.is_readable_by(viewer) {
            self.content = NO_CONTENT_PLACEHOLDER.to_string();
        }
    }

    pub fn redacted_for(mut self, viewer: i64) -> Self {
        self.redact_for(viewer);
        self
    }
}

/// 투표 수 내림차순으로 정렬해 앞의 `n`개를 돌려줍니다.
///
/// 투표 수가 같으면 먼저 만들어진 포스트잇이 앞에 옵니다.
/// `created_at`이 같은 밀리초에 찍혔을 수 있으므로 마지막으로 id(자동 증가)를 비교합니다.
pub fn top_voted(mut postits: Vec<Postit>, n: usize) -> Vec<Postit> {
    postits.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    postits.truncate(n);
    postits
}

/// 포스트잇 생성 요청: `POST /api/v1/postits`
#[derive(Debug, Deserialize)]
pub struct CreatePostitRequest {
    pub question_id: i64,
    pub content: String,
    /// 생략하면 비공개
    #[serde(default)]
    pub is_visible: bool,
}

/// 포스트잇 수정 요청: `PUT /api/v1/postits/{id}`
///
/// 내용과 공개 여부를 통째로 바꿉니다.
#[derive(Debug, Deserialize)]
pub struct UpdatePostitRequest {
    pub content: String,
    #[serde(default)]
    pub is_visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postit(id: i64, votes: i64, created_at: &str) -> Postit {
        Postit {
            id,
            user_id: 1,
            question_id: 1,
            votes,
            content: format!("note {id}"),
            is_visible: true,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    fn ids(postits: &[Postit]) -> Vec<i64> {
        postits.iter().map(|p| p.id).collect()
    }

    #[test]
    fn top_voted_orders_by_votes_then_creation() {
        let postits = vec![
            postit(1, 2, "2026-01-01T00:00:01.000Z"),
            postit(2, 5, "2026-01-01T00:00:02.000Z"),
            postit(3, 2, "2026-01-01T00:00:00.500Z"),
            postit(4, 0, "2026-01-01T00:00:00.000Z"),
        ];

        assert_eq!(ids(&top_voted(postits.clone(), 3)), vec![2, 3, 1]);
        // n이 전체보다 크면 전부, 같은 순서로
        assert_eq!(ids(&top_voted(postits.clone(), 10)), vec![2, 3, 1, 4]);
        assert!(top_voted(postits, 0).is_empty());
    }

    #[test]
    fn same_timestamp_falls_back_to_id() {
        let same = "2026-01-01T00:00:00.000Z";
        let postits = vec![postit(9, 1, same), postit(3, 1, same), postit(5, 1, same)];
        assert_eq!(ids(&top_voted(postits, 3)), vec![3, 5, 9]);
    }

    #[test]
    fn redaction_keeps_votes_and_author() {
        let mut hidden = postit(1, 7, "2026-01-01T00:00:00.000Z");
        hidden.is_visible = false;
        hidden.user_id = 2;

        let seen_by_other = hidden.clone().redacted_for(1);
        assert_eq!(seen_by_other.content, NO_CONTENT_PLACEHOLDER);
        assert_eq!(seen_by_other.votes, 7);
        assert_eq!(seen_by_other.user_id, 2);

        let seen_by_author = hidden.redacted_for(2);
        assert_eq!(seen_by_author.content, "note 1");
    }

    #[test]
    fn create_request_defaults_to_private() {
        let req: CreatePostitRequest =
            serde_json::from_str(r#"{ "question_id": 4, "content": "X" }"#).unwrap();
        assert!(!req.is_visible);
    }
}
