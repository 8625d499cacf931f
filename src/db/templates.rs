//! # 템플릿 데이터베이스 쿼리 모듈
//!
//! `templates`와 `template_questions` 테이블에 대한 쿼리 함수들입니다.
//!
//! ## 테이블 구조
//! - `templates`: 템플릿 엔티티 (id, name, user_id)
//! - `template_questions`: 템플릿의 질문 문구, `position` 순서로 정렬

use std::collections::HashMap;

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 새 템플릿과 질문 문구들을 한 트랜잭션으로 저장합니다.
///
/// `pool.begin()`으로 트랜잭션을 열고, 모든 INSERT가 성공했을 때만 `commit()`합니다.
/// 중간에 `?`로 빠져나가면 `tx`가 drop되면서 자동으로 롤백됩니다.
pub async fn create_template(
    pool: &SqlitePool,
    user_id: i64,
    template: &NewTemplate,
) -> Result<Template, AppError> {
    let mut tx = pool.begin().await?;

    // last_insert_rowid(): SQLite가 방금 발급한 AUTOINCREMENT id
    let id = sqlx::query("INSERT INTO templates (name, user_id) VALUES (?, ?)")
        .bind(&template.name)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for (position, content) in template.questions.iter().enumerate() {
        sqlx::query(
            "INSERT INTO template_questions (template_id, position, content) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(position as i64)
        .bind(content)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_template(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created template".to_string()))
}

/// 모든 템플릿을 질문 문구와 함께 조회합니다 (최신순).
pub async fn list_templates(pool: &SqlitePool) -> Result<Vec<Template>, AppError> {
    let mut templates = sqlx::query_as::<_, Template>(
        "SELECT id, name, user_id, created_at FROM templates ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    let questions = sqlx::query_as::<_, TemplateQuestion>(
        r#"
        SELECT id, template_id, position, content
        FROM template_questions
        ORDER BY template_id, position, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    // template_id별로 묶은 뒤 각 템플릿에 붙입니다.
    let mut by_template: HashMap<i64, Vec<TemplateQuestion>> = HashMap::new();
    for question in questions {
        by_template.entry(question.template_id).or_default().push(question);
    }
    for template in &mut templates {
        template.questions = by_template.remove(&template.id).unwrap_or_default();
    }

    Ok(templates)
}

/// ID로 템플릿 하나를 질문 문구와 함께 조회합니다.
///
/// - `Ok(Some(Template))`: 찾은 경우
/// - `Ok(None)`: 해당 ID의 템플릿이 없는 경우
pub async fn get_template(pool: &SqlitePool, id: i64) -> Result<Option<Template>, AppError> {
    let template = sqlx::query_as::<_, Template>(
        "SELECT id, name, user_id, created_at FROM templates WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut template) = template else {
        return Ok(None);
    };

    template.questions = sqlx::query_as::<_, TemplateQuestion>(
        r#"
        SELECT id, template_id, position, content
        FROM template_questions
        WHERE template_id = ?
        ORDER BY position, id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(template))
}

/// 템플릿과 그 질문 문구를 함께 삭제합니다.
///
/// 스키마에도 `ON DELETE CASCADE`가 있지만, 명시적으로 자식부터 지워
/// 외래키 설정과 무관하게 같은 트랜잭션에서 함께 사라지게 합니다.
/// 이 템플릿으로 만든 세션은 질문을 복사해 두었으므로 영향이 없습니다.
///
/// - `Ok(true)`: 삭제 성공
/// - `Ok(false)`: 해당 ID의 템플릿이 없음
pub async fn delete_template(pool: &SqlitePool, id: i64) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM template_questions WHERE template_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM templates WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_template(name: &str, questions: &[&str]) -> NewTemplate {
        NewTemplate {
            name: name.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn create_then_get_keeps_question_order() {
        let pool = test_pool().await;
        let created = create_template(&pool, 1, &new_template("T1", &["Good?", "Bad?", "Next?"]))
            .await
            .unwrap();

        let fetched = get_template(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "T1");
        assert_eq!(fetched.user_id, 1);
        let prompts: Vec<&str> = fetched.questions.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(prompts, vec!["Good?", "Bad?", "Next?"]);
    }

    #[tokio::test]
    async fn list_attaches_questions_to_each_template() {
        let pool = test_pool().await;
        let a = create_template(&pool, 1, &new_template("A", &["a1"])).await.unwrap();
        let b = create_template(&pool, 2, &new_template("B", &["b1", "b2"])).await.unwrap();

        let templates = list_templates(&pool).await.unwrap();
        assert_eq!(templates.len(), 2);
        let find = |id| templates.iter().find(|t| t.id == id).unwrap();
        assert_eq!(find(a.id).questions.len(), 1);
        assert_eq!(find(b.id).questions.len(), 2);
    }

    #[tokio::test]
    async fn delete_removes_questions_too() {
        let pool = test_pool().await;
        let t = create_template(&pool, 1, &new_template("T1", &["Good?", "Bad?"]))
            .await
            .unwrap();

        assert!(delete_template(&pool, t.id).await.unwrap());
        assert!(get_template(&pool, t.id).await.unwrap().is_none());

        let (left,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM template_questions WHERE template_id = ?")
                .bind(t.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(left, 0);

        // 두 번째 삭제는 없는 행
        assert!(!delete_template(&pool, t.id).await.unwrap());
    }

    #[tokio::test]
    async fn failed_delete_keeps_template_and_questions() {
        let pool = test_pool().await;
        let t = create_template(&pool, 1, &new_template("T1", &["Good?", "Bad?"]))
            .await
            .unwrap();

        // 질문을 지운 뒤 템플릿 삭제에서 실패하도록
        sqlx::query(
            r#"
            CREATE TRIGGER keep_templates BEFORE DELETE ON templates
            BEGIN
                SELECT RAISE(ABORT, 'delete failed');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(delete_template(&pool, t.id).await, Err(AppError::Database(_))));

        let fetched = get_template(&pool, t.id).await.unwrap().unwrap();
        assert_eq!(fetched.questions.len(), 2);
    }

    #[tokio::test]
    async fn failed_create_leaves_nothing() {
        let pool = test_pool().await;
        sqlx::query(
            r#"
            CREATE TRIGGER fail_second_prompt BEFORE INSERT ON template_questions
            WHEN NEW.position = 1
            BEGIN
                SELECT RAISE(ABORT, 'insert failed');
            END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = create_template(&pool, 1, &new_template("T1", &["Good?", "Bad?"])).await;
        assert!(matches!(result, Err(AppError::Database(_))));
        assert!(list_templates(&pool).await.unwrap().is_empty());
    }
}
