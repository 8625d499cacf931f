//! # 포스트잇 데이터베이스 쿼리 모듈
//!
//! 포스트잇 생성/조회/수정/삭제와 투표 쿼리 함수들입니다.
//! 작성자 확인은 서비스 계층(`services::retro`)에서 하고,
//! 여기서는 저장소 작업만 수행합니다.

use crate::error::AppError;
use crate::models::Postit;
use sqlx::SqlitePool;

/// 포스트잇이 속한 세션 ID를 조회합니다 (알림 범위를 정할 때 사용).
pub async fn postit_session_id(pool: &SqlitePool, postit_id: i64) -> Result<Option<i64>, AppError> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT q.session_id
        FROM postits p
        JOIN questions q ON q.id = p.question_id
        WHERE p.id = ?
        "#,
    )
    .bind(postit_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(session_id,)| session_id))
}

/// 새 포스트잇을 만듭니다. 투표 수는 0에서 시작합니다.
///
/// 질문 존재 확인은 `question_id` 외래키가 INSERT 한 문장 안에서 합니다.
/// 따로 조회한 뒤 넣으면 그 사이에 세션이 삭제될 수 있기 때문입니다.
///
/// - `Ok(Some(Postit))`: 생성 성공
/// - `Ok(None)`: 질문이 없음 (외래키 위반)
pub async fn create_postit(
    pool: &SqlitePool,
    user_id: i64,
    question_id: i64,
    content: &str,
    is_visible: bool,
) -> Result<Option<Postit>, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO postits (user_id, question_id, content, is_visible)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(content)
    .bind(is_visible)
    .execute(pool)
    .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let postit = get_postit(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created postit".to_string()))?;
    Ok(Some(postit))
}

pub async fn get_postit(pool: &SqlitePool, id: i64) -> Result<Option<Postit>, AppError> {
    let postit = sqlx::query_as::<_, Postit>(
        r#"
        SELECT id, user_id, question_id, votes, content, is_visible, created_at, updated_at
        FROM postits
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(postit)
}

/// 내용과 공개 여부를 바꿉니다. 투표 수는 건드리지 않습니다.
///
/// - `Ok(Some(Postit))`: 수정 성공
/// - `Ok(None)`: 해당 ID의 포스트잇이 없음
pub async fn update_postit(
    pool: &SqlitePool,
    id: i64,
    content: &str,
    is_visible: bool,
) -> Result<Option<Postit>, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE postits
        SET content = ?, is_visible = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(content)
    .bind(is_visible)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_postit(pool, id).await
}

pub async fn delete_postit(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM postits WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 투표 수를 1 올립니다.
///
/// `votes = votes + 1`을 DB 안에서 계산하므로 동시에 여러 표가 들어와도
/// 읽고-쓰기 경합으로 표가 사라지지 않습니다.
pub async fn vote_postit(pool: &SqlitePool, id: i64) -> Result<Option<Postit>, AppError> {
    let result = sqlx::query("UPDATE postits SET votes = votes + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_postit(pool, id).await
}
