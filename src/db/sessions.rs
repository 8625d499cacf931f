//! # 회고 세션 데이터베이스 쿼리 모듈
//!
//! 세션 생성, 조회, 삭제를 담당하는 SQL 쿼리 함수들입니다.
//!
//! ## 세션 라이프사이클
//! ```text
//! [템플릿] ─ create_session_from_template() ─→ 세션 + 복사된 질문들
//!                                              │
//!            참가자들이 포스트잇 작성/투표 ─────┤
//!                                              │
//!            delete_session() ─→ 포스트잇 → 질문 → 세션 순서로 삭제
//! ```
//!
//! 생성과 삭제는 모두 트랜잭션 하나로 묶여 있어서
//! 질문 없는 세션이나 부모 없는 포스트잇이 남지 않습니다.

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::{Postit, Question, Session};
use sqlx::SqlitePool;

/// 템플릿의 질문들을 복사해 새 세션을 만듭니다.
///
/// ## 처리 흐름 (하나의 트랜잭션)
/// 1. 템플릿 존재 확인, 없으면 `Ok(None)` (라우트/서비스에서 404로 변환)
/// 2. 템플릿 질문 문구를 순서대로 읽기
/// 3. `sessions`에 새 행 삽입
/// 4. 각 문구를 `questions`에 새 행으로 삽입 (템플릿 행을 참조하지 않음)
/// 5. commit 후 질문이 채워진 세션을 다시 조회해 반환
pub async fn create_session_from_template(
    pool: &SqlitePool,
    template_id: i64,
    user_id: i64,
    name: &str,
) -> Result<Option<Session>, AppError> {
    let mut tx = pool.begin().await?;

    let template: Option<(i64,)> = sqlx::query_as("SELECT id FROM templates WHERE id = ?")
        .bind(template_id)
        .fetch_optional(&mut *tx)
        .await?;
    if template.is_none() {
        // tx는 여기서 drop되며 롤백됩니다 (아직 아무것도 쓰지 않았음)
        return Ok(None);
    }

    let prompts: Vec<(String,)> = sqlx::query_as(
        "SELECT content FROM template_questions WHERE template_id = ? ORDER BY position, id",
    )
    .bind(template_id)
    .fetch_all(&mut *tx)
    .await?;

    let session_id = sqlx::query("INSERT INTO sessions (name, user_id) VALUES (?, ?)")
        .bind(name)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for (position, (content,)) in prompts.iter().enumerate() {
        sqlx::query("INSERT INTO questions (session_id, position, content) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(position as i64)
            .bind(content)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let session = get_session_with_children(pool, session_id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created session".to_string()))?;
    Ok(Some(session))
}

/// 모든 세션을 최신순으로 조회합니다 (질문/포스트잇 제외).
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>, AppError> {
    let sessions = sqlx::query_as::<_, Session>(
        "SELECT id, name, user_id, created_at FROM sessions ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(sessions)
}

/// ID로 세션 행 하나만 조회합니다 (소유자 확인용).
pub async fn get_session(pool: &SqlitePool, id: i64) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, name, user_id, created_at FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// 세션을 질문과 포스트잇까지 채워서 조회합니다.
///
/// 쿼리는 세 번(세션, 질문, 포스트잇) 실행하고 Rust 쪽에서 묶습니다.
/// 질문은 `position` 순서, 포스트잇은 작성 순서입니다.
/// 여기서 돌려주는 값은 가려지지 않은 원본이므로, 사용자에게 내보내기 전에
/// 반드시 `Session::redacted_for`를 거쳐야 합니다.
pub async fn get_session_with_children(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Session>, AppError> {
    let Some(mut session) = get_session(pool, id).await? else {
        return Ok(None);
    };

    let mut questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, session_id, position, content
        FROM questions
        WHERE session_id = ?
        ORDER BY position, id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Postit>> = HashMap::new();
    for postit in list_session_postits(pool, id).await? {
        by_question.entry(postit.question_id).or_default().push(postit);
    }
    for question in &mut questions {
        question.postits = by_question.remove(&question.id).unwrap_or_default();
    }

    session.questions = questions;
    Ok(Some(session))
}

/// 세션의 모든 질문에 달린 포스트잇을 작성 순서대로 조회합니다.
pub async fn list_session_postits(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<Vec<Postit>, AppError> {
    let postits = sqlx::query_as::<_, Postit>(
        r#"
        SELECT p.id, p.user_id, p.question_id, p.votes, p.content, p.is_visible,
               p.created_at, p.updated_at
        FROM postits p
        JOIN questions q ON q.id = p.question_id
        WHERE q.session_id = ?
        ORDER BY p.created_at, p.id
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(postits)
}

/// 세션과 그 질문, 포스트잇을 한 트랜잭션으로 삭제합니다.
///
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 세션이 없음
pub async fn delete_session(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM postits WHERE question_id IN (SELECT id FROM questions WHERE session_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM questions WHERE session_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}
