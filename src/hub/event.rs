//! # 허브 이벤트 정의
//!
//! 허브를 지나가는 메시지의 모양입니다. 허브는 `action` 문자열의 의미를 해석하지 않고,
//! `session_id`로 어느 연결에 보낼지만 결정합니다.
//!
//! 서버 → 클라이언트 JSON 예:
//! ```text
//! { "action": "postit-created", "session_id": 3 }
//! { "action": "connected", "message": "Connected to server" }
//! ```

use serde::{Deserialize, Serialize};

/// 서비스 계층이 발행하는 action 이름들
pub mod actions {
    pub const CONNECTED: &str = "connected";
    pub const TEMPLATE_CREATED: &str = "template-created";
    pub const TEMPLATE_DELETED: &str = "template-deleted";
    pub const SESSION_CREATED: &str = "session-created";
    pub const SESSION_DELETED: &str = "session-deleted";
    pub const POSTIT_CREATED: &str = "postit-created";
    pub const POSTIT_UPDATED: &str = "postit-updated";
    pub const POSTIT_DELETED: &str = "postit-deleted";
    pub const VOTE_CAST: &str = "vote-cast";
}

/// 연결된 클라이언트에게 내려가는 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubEvent {
    pub action: String,
    /// 특정 세션에 묶인 이벤트면 그 세션 ID, 아니면 모든 연결 대상
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    /// 클라이언트가 보낸 요청과 짝을 맞출 때 쓰는 값 (그대로 돌려줌)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 클라이언트가 보낸 메시지를 허브가 다시 뿌린 것이면 true.
    /// 서버가 발행한 변경 알림과 구분하는 데 씁니다.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub from_client: bool,
}

impl HubEvent {
    /// 모든 연결에 가는 이벤트
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            session_id: None,
            correlation_id: None,
            message: None,
            from_client: false,
        }
    }

    /// 해당 세션을 보고 있는 연결(과 전역 연결)에만 가는 이벤트
    pub fn for_session(action: impl Into<String>, session_id: i64) -> Self {
        Self {
            session_id: Some(session_id),
            ..Self::new(action)
        }
    }

    /// 연결 직후 그 연결 하나에만 보내는 확인 메시지
    pub fn connected() -> Self {
        Self {
            message: Some("Connected to server".to_string()),
            ..Self::new(actions::CONNECTED)
        }
    }

    /// 클라이언트 메시지를 보낸 연결의 범위로 되돌려 보낼 이벤트로 바꿉니다.
    pub fn relayed(message: ClientMessage, session_id: Option<i64>) -> Self {
        Self {
            session_id,
            correlation_id: message.correlation_id,
            from_client: true,
            ..Self::new(message.action)
        }
    }
}

/// 연결이 지켜보는 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// 모든 이벤트를 받음 (`/ws`)
    Global,
    /// 이 세션의 이벤트와 세션에 묶이지 않은 이벤트를 받음 (`/sessions/{id}/ws`)
    Session(i64),
}

impl Scope {
    pub fn accepts(&self, event: &HubEvent) -> bool {
        match (self, event.session_id) {
            (Scope::Global, _) | (_, None) => true,
            (Scope::Session(watched), Some(target)) => *watched == target,
        }
    }

    pub fn session_id(&self) -> Option<i64> {
        match self {
            Scope::Global => None,
            Scope::Session(id) => Some(*id),
        }
    }
}

/// 클라이언트 → 서버 메시지
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientMessage {
    pub action: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
}
