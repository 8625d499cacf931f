//! # 회고 서비스
//!
//! 템플릿, 세션, 포스트잇에 대한 모든 작업이 이 모듈을 거칩니다.
//!
//! ## 변경 작업의 처리 순서
//! ```text
//! 1. 규칙 확인   ─ 존재 여부(NotFound), 소유자(Forbidden), 입력값(Validation)
//! 2. 저장        ─ db 모듈 (연쇄 작업은 트랜잭션 하나)
//! 3. 허브 알림   ─ 저장이 성공했을 때만, 실패해도 요청은 성공
//! ```
//!
//! 읽기 작업은 호출한 사용자(viewer) 기준으로 포스트잇 내용을 가려서 돌려줍니다.
//! 투표는 소유자 확인이 없습니다. 누구나 몇 번이든 투표할 수 있습니다.

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::hub::{actions, Hub, HubEvent};
use crate::models::{
    top_voted, CreatePostitRequest, CreateSessionRequest, CreateTemplateRequest, Postit, Session,
    Template, UpdatePostitRequest,
};

/// 허브에 이벤트를 넣습니다. 실패는 기록만 하고 호출한 쪽에 알리지 않습니다.
fn announce(hub: &Hub, event: HubEvent) {
    let action = event.action.clone();
    if let Err(e) = hub.publish(event) {
        tracing::warn!(%action, error = %e, "failed to publish hub event");
    }
}

// ── 템플릿 ──

pub async fn create_template(
    pool: &SqlitePool,
    hub: &Hub,
    user_id: i64,
    req: &CreateTemplateRequest,
) -> Result<Template, AppError> {
    let new_template = req.validate()?;
    let template = db::create_template(pool, user_id, &new_template).await?;

    tracing::info!(template_id = template.id, user_id, "template created");
    announce(hub, HubEvent::new(actions::TEMPLATE_CREATED));
    Ok(template)
}

pub async fn list_templates(pool: &SqlitePool) -> Result<Vec<Template>, AppError> {
    db::list_templates(pool).await
}

/// 템플릿 하나를 질문과 함께 조회합니다. 소유자만 볼 수 있습니다.
pub async fn get_template(pool: &SqlitePool, id: i64, viewer: i64) -> Result<Template, AppError> {
    let template = db::get_template(pool, id).await?.ok_or(AppError::NotFound)?;
    if template.user_id != viewer {
        return Err(AppError::Forbidden);
    }
    Ok(template)
}

/// 템플릿과 그 질문 문구를 삭제합니다. 이미 만들어진 세션은 그대로 남습니다.
pub async fn delete_template(
    pool: &SqlitePool,
    hub: &Hub,
    id: i64,
    caller: i64,
) -> Result<(), AppError> {
    let template = db::get_template(pool, id).await?.ok_or(AppError::NotFound)?;
    if template.user_id != caller {
        return Err(AppError::Forbidden);
    }

    if !db::delete_template(pool, id).await? {
        // 확인과 삭제 사이에 다른 요청이 먼저 지운 경우
        return Err(AppError::NotFound);
    }

    tracing::info!(template_id = id, "template deleted");
    announce(hub, HubEvent::new(actions::TEMPLATE_DELETED));
    Ok(())
}

// ── 세션 ──

/// 템플릿의 질문을 복사해 세션을 만듭니다.
pub async fn create_session(
    pool: &SqlitePool,
    hub: &Hub,
    user_id: i64,
    req: &CreateSessionRequest,
) -> Result<Session, AppError> {
    let name = req.validated_name()?;
    let session = db::create_session_from_template(pool, req.template_id, user_id, &name)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(session_id = session.id, template_id = req.template_id, "session created");
    // 새 세션을 보고 있는 연결은 아직 없으므로 모든 연결에 알림
    announce(hub, HubEvent::new(actions::SESSION_CREATED));
    Ok(session)
}

pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<Session>, AppError> {
    db::list_sessions(pool).await
}

/// 세션을 질문, 포스트잇과 함께 `viewer` 기준으로 가려서 돌려줍니다.
///
/// 로그인한 사용자라면 누구나 조회할 수 있습니다 (참가자도 보드를 봐야 하므로).
pub async fn get_session(pool: &SqlitePool, id: i64, viewer: i64) -> Result<Session, AppError> {
    let session = db::get_session_with_children(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(session.redacted_for(viewer))
}

/// 세션과 질문, 포스트잇을 모두 삭제합니다. 세션 소유자만 가능합니다.
pub async fn delete_session(
    pool: &SqlitePool,
    hub: &Hub,
    id: i64,
    caller: i64,
) -> Result<(), AppError> {
    let session = db::get_session(pool, id).await?.ok_or(AppError::NotFound)?;
    if session.user_id != caller {
        return Err(AppError::Forbidden);
    }

    if !db::delete_session(pool, id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(session_id = id, "session deleted");
    announce(hub, HubEvent::for_session(actions::SESSION_DELETED, id));
    Ok(())
}

/// 세션 전체에서 투표를 많이 받은 포스트잇 `n`개를 돌려줍니다.
///
/// 정렬은 투표 수 내림차순, 같으면 먼저 작성된 순서입니다.
/// 결과도 `viewer` 기준으로 가립니다.
pub async fn top_voted_postits(
    pool: &SqlitePool,
    session_id: i64,
    n: usize,
    viewer: i64,
) -> Result<Vec<Postit>, AppError> {
    if db::get_session(pool, session_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let postits = db::list_session_postits(pool, session_id).await?;
    Ok(top_voted(postits, n)
        .into_iter()
        .map(|postit| postit.redacted_for(viewer))
        .collect())
}

// ── 포스트잇 ──

/// 질문에 포스트잇을 붙입니다. 로그인한 사용자라면 누구나 가능합니다.
pub async fn create_postit(
    pool: &SqlitePool,
    hub: &Hub,
    user_id: i64,
    req: &CreatePostitRequest,
) -> Result<Postit, AppError> {
    let postit = db::create_postit(pool, user_id, req.question_id, &req.content, req.is_visible)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(session_id) = db::postit_session_id(pool, postit.id).await? {
        tracing::debug!(postit_id = postit.id, session_id, "postit created");
        announce(hub, HubEvent::for_session(actions::POSTIT_CREATED, session_id));
    }
    Ok(postit)
}

pub async fn get_postit(pool: &SqlitePool, id: i64, viewer: i64) -> Result<Postit, AppError> {
    let postit = db::get_postit(pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(postit.redacted_for(viewer))
}

/// 내용과 공개 여부를 바꿉니다. 작성자만 가능합니다.
pub async fn update_postit(
    pool: &SqlitePool,
    hub: &Hub,
    id: i64,
    caller: i64,
    req: &UpdatePostitRequest,
) -> Result<Postit, AppError> {
    let postit = db::get_postit(pool, id).await?.ok_or(AppError::NotFound)?;
    if postit.user_id != caller {
        return Err(AppError::Forbidden);
    }

    let updated = db::update_postit(pool, id, &req.content, req.is_visible)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(session_id) = db::postit_session_id(pool, id).await? {
        announce(hub, HubEvent::for_session(actions::POSTIT_UPDATED, session_id));
    }
    Ok(updated)
}

pub async fn delete_postit(
    pool: &SqlitePool,
    hub: &Hub,
    id: i64,
    caller: i64,
) -> Result<(), AppError> {
    let postit = db::get_postit(pool, id).await?.ok_or(AppError::NotFound)?;
    if postit.user_id != caller {
        return Err(AppError::Forbidden);
    }

    // 삭제하고 나면 질문과의 연결을 따라갈 수 없으므로 먼저 조회
    let session_id = db::postit_session_id(pool, id).await?;

    if !db::delete_postit(pool, id).await? {
        return Err(AppError::NotFound);
    }

    if let Some(session_id) = session_id {
        announce(hub, HubEvent::for_session(actions::POSTIT_DELETED, session_id));
    }
    Ok(())
}

/// 투표 수를 1 올리고, 올라간 포스트잇을 `voter` 기준으로 가려서 돌려줍니다.
pub async fn vote_postit(
    pool: &SqlitePool,
    hub: &Hub,
    id: i64,
    voter: i64,
) -> Result<Postit, AppError> {
    let postit = db::vote_postit(pool, id).await?.ok_or(AppError::NotFound)?;

    if let Some(session_id) = db::postit_session_id(pool, id).await? {
        announce(hub, HubEvent::for_session(actions::VOTE_CAST, session_id));
    }
    Ok(postit.redacted_for(voter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::hub::Scope;
    use crate::models::NO_CONTENT_PLACEHOLDER;
    use tokio::sync::mpsc;

    const MODERATOR: i64 = 1;
    const ALICE: i64 = 2;
    const BOB: i64 = 3;

    fn template_request(name: &str, questions: &[&str]) -> CreateTemplateRequest {
        CreateTemplateRequest {
            name: name.into(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    async fn seed_session(pool: &SqlitePool, hub: &Hub) -> Session {
        let template = create_template(pool, hub, MODERATOR, &template_request("T1", &["Q1", "Q2"]))
            .await
            .unwrap();
        create_session(
            pool,
            hub,
            MODERATOR,
            &CreateSessionRequest {
                template_id: template.id,
                name: "S1".into(),
            },
        )
        .await
        .unwrap()
    }

    async fn postit(
        pool: &SqlitePool,
        hub: &Hub,
        author: i64,
        question_id: i64,
        content: &str,
        is_visible: bool,
    ) -> Postit {
        let req = CreatePostitRequest {
            question_id,
            content: content.into(),
            is_visible,
        };
        create_postit(pool, hub, author, &req).await.unwrap()
    }

    #[tokio::test]
    async fn private_note_is_redacted_for_other_viewers() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;
        let q1 = session.questions[0].id;
        let note = postit(&pool, &hub, ALICE, q1, "X", false).await;

        let seen_by_bob = get_session(&pool, session.id, BOB).await.unwrap();
        let redacted = &seen_by_bob.questions[0].postits[0];
        assert_eq!(redacted.content, NO_CONTENT_PLACEHOLDER);
        assert_eq!(redacted.id, note.id);
        assert_eq!(redacted.votes, 0);

        let seen_by_alice = get_session(&pool, session.id, ALICE).await.unwrap();
        assert_eq!(seen_by_alice.questions[0].postits[0].content, "X");

        // 원본은 그대로
        let stored = db::get_postit(&pool, note.id).await.unwrap().unwrap();
        assert_eq!(stored.content, "X");
    }

    #[tokio::test]
    async fn retro_walkthrough() {
        let pool = test_pool().await;
        let hub = Hub::spawn();
        let session = seed_session(&pool, &hub).await;
        let q1 = session.questions[0].id;

        let (tx, mut events) = mpsc::channel(16);
        hub.register(Scope::Session(session.id), tx).unwrap();
        hub.connection_count().await.unwrap();
        assert_eq!(events.recv().await.unwrap().action, actions::CONNECTED);

        let note = postit(&pool, &hub, ALICE, q1, "X", false).await;
        assert_eq!(events.recv().await.unwrap().action, actions::POSTIT_CREATED);

        let bob_view = get_session(&pool, session.id, BOB).await.unwrap();
        assert_eq!(bob_view.questions[0].postits[0].content, NO_CONTENT_PLACEHOLDER);

        let voted = vote_postit(&pool, &hub, note.id, BOB).await.unwrap();
        assert_eq!(voted.votes, 1);
        assert_eq!(voted.content, NO_CONTENT_PLACEHOLDER);
        let vote_event = events.recv().await.unwrap();
        assert_eq!(vote_event.action, actions::VOTE_CAST);
        assert_eq!(vote_event.session_id, Some(session.id));

        let top = top_voted_postits(&pool, session.id, 1, BOB).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, note.id);
        assert_eq!(top[0].votes, 1);
        assert_eq!(top[0].content, NO_CONTENT_PLACEHOLDER);

        delete_session(&pool, &hub, session.id, MODERATOR).await.unwrap();
        assert_eq!(events.recv().await.unwrap().action, actions::SESSION_DELETED);
        assert!(matches!(get_session(&pool, session.id, MODERATOR).await, Err(AppError::NotFound)));
        assert!(matches!(get_postit(&pool, note.id, ALICE).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn new_session_is_announced_to_every_connection() {
        let pool = test_pool().await;
        let hub = Hub::spawn();
        let (tx, mut elsewhere) = mpsc::channel(8);
        hub.register(Scope::Session(999), tx).unwrap();

        seed_session(&pool, &hub).await;
        hub.connection_count().await.unwrap();

        assert_eq!(elsewhere.recv().await.unwrap().action, actions::CONNECTED);
        assert_eq!(elsewhere.recv().await.unwrap().action, actions::TEMPLATE_CREATED);
        let created = elsewhere.recv().await.unwrap();
        assert_eq!(created.action, actions::SESSION_CREATED);
        assert_eq!(created.session_id, None);
        assert!(!created.from_client);
    }

    #[tokio::test]
    async fn postit_on_deleted_session_is_not_found() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;
        let question_id = session.questions[0].id;
        delete_session(&pool, &hub, session.id, MODERATOR).await.unwrap();

        let req = CreatePostitRequest {
            question_id,
            content: "late".into(),
            is_visible: true,
        };
        assert!(matches!(
            create_postit(&pool, &hub, ALICE, &req).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn top_voted_orders_by_votes_then_creation() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;
        let (q1, q2) = (session.questions[0].id, session.questions[1].id);

        let first = postit(&pool, &hub, ALICE, q1, "a", true).await;
        let second = postit(&pool, &hub, BOB, q2, "b", true).await;
        let third = postit(&pool, &hub, ALICE, q2, "c", true).await;
        for _ in 0..2 {
            vote_postit(&pool, &hub, third.id, BOB).await.unwrap();
        }
        vote_postit(&pool, &hub, second.id, ALICE).await.unwrap();
        vote_postit(&pool, &hub, first.id, ALICE).await.unwrap();

        let ids: Vec<i64> = top_voted_postits(&pool, session.id, 10, ALICE)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![third.id, first.id, second.id]);

        let top_two = top_voted_postits(&pool, session.id, 2, ALICE).await.unwrap();
        assert_eq!(top_two.len(), 2);

        assert!(matches!(
            top_voted_postits(&pool, 999, 3, ALICE).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_template() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let template = create_template(&pool, &hub, MODERATOR, &template_request("T1", &["Q1"]))
            .await
            .unwrap();

        let result = delete_template(&pool, &hub, template.id, ALICE).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
        assert!(get_template(&pool, template.id, MODERATOR).await.is_ok());

        assert!(matches!(
            get_template(&pool, template.id, ALICE).await,
            Err(AppError::Forbidden)
        ));

        delete_template(&pool, &hub, template.id, MODERATOR).await.unwrap();
        assert!(matches!(
            get_template(&pool, template.id, MODERATOR).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn invalid_template_is_rejected() {
        let pool = test_pool().await;
        let hub = Hub::detached();

        let empty = create_template(&pool, &hub, MODERATOR, &template_request("T1", &[])).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));
        let unnamed = create_template(&pool, &hub, MODERATOR, &template_request("  ", &["Q"])).await;
        assert!(matches!(unnamed, Err(AppError::Validation(_))));
        assert!(list_templates(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_from_missing_template_is_not_found() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let req = CreateSessionRequest {
            template_id: 77,
            name: "S1".into(),
        };
        assert!(matches!(
            create_session(&pool, &hub, MODERATOR, &req).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn only_author_edits_or_deletes_postit() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;
        let note = postit(&pool, &hub, ALICE, session.questions[0].id, "X", false).await;

        let edit = UpdatePostitRequest {
            content: "hijacked".into(),
            is_visible: true,
        };
        assert!(matches!(
            update_postit(&pool, &hub, note.id, BOB, &edit).await,
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            delete_postit(&pool, &hub, note.id, BOB).await,
            Err(AppError::Forbidden)
        ));
        // 세션 소유자라도 남의 포스트잇은 못 지움
        assert!(matches!(
            delete_postit(&pool, &hub, note.id, MODERATOR).await,
            Err(AppError::Forbidden)
        ));

        let reveal = UpdatePostitRequest {
            content: "X, revealed".into(),
            is_visible: true,
        };
        let updated = update_postit(&pool, &hub, note.id, ALICE, &reveal).await.unwrap();
        assert_eq!(get_postit(&pool, note.id, BOB).await.unwrap().content, updated.content);

        delete_postit(&pool, &hub, note.id, ALICE).await.unwrap();
        assert!(matches!(get_postit(&pool, note.id, ALICE).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn non_owner_cannot_delete_session() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;

        assert!(matches!(
            delete_session(&pool, &hub, session.id, ALICE).await,
            Err(AppError::Forbidden)
        ));
        assert!(get_session(&pool, session.id, ALICE).await.is_ok());
    }

    #[tokio::test]
    async fn mutations_succeed_without_a_running_hub() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let session = seed_session(&pool, &hub).await;

        let note = postit(&pool, &hub, ALICE, session.questions[0].id, "X", true).await;
        let voted = vote_postit(&pool, &hub, note.id, BOB).await.unwrap();
        assert_eq!(voted.votes, 1);
        assert!(db::get_postit(&pool, note.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn postit_on_missing_question_is_not_found() {
        let pool = test_pool().await;
        let hub = Hub::detached();
        let req = CreatePostitRequest {
            question_id: 404,
            content: "X".into(),
            is_visible: false,
        };
        assert!(matches!(
            create_postit(&pool, &hub, ALICE, &req).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(vote_postit(&pool, &hub, 404, ALICE).await, Err(AppError::NotFound)));
    }
}
