//! # 브로드캐스트 허브 (Broadcast Hub)
//!
//! 프로세스 안의 모든 라이브 연결(WebSocket)을 관리하고,
//! 발행된 이벤트를 연결들에게 나눠 보내는(fan-out) 컴포넌트입니다.
//!
//! ## 구조
//! ```text
//!  서비스 계층 ─ publish() ─┐
//!  연결 읽기 태스크 ─ forward() ─┼─▶ [무제한 명령 큐] ─▶ 코디네이터 태스크 ─┬─▶ 연결 A 송신 큐
//!  WebSocket 핸들러 ─ register()/unregister() ─┘     (레지스트리 소유)       ├─▶ 연결 B 송신 큐
//!                                                                         └─▶ 연결 C 송신 큐
//! ```
//!
//! - 레지스트리(연결 목록)는 코디네이터 태스크 하나만 소유하고 수정합니다.
//!   바깥에서는 `Hub` 핸들의 `register`/`unregister`/`publish`로만 접근합니다.
//! - 코디네이터는 큐에서 명령을 하나씩 꺼내므로, 모든 연결이 같은 순서로 이벤트를 봅니다.
//! - 연결로 보낼 때는 `try_send`(기다리지 않음)를 씁니다. 송신 큐가 가득 찼거나
//!   닫혀 있으면 그 연결만 레지스트리에서 빼고 다음 연결로 넘어갑니다.
//!   레지스트리에서 빠지면 송신 큐의 Sender가 drop되어 연결 쪽 쓰기 루프가 끝나고 소켓이 닫힙니다.
//! - 전달은 최대 한 번(at-most-once)입니다. 재연결 사이에 발행된 이벤트는 다시 보내지 않습니다.

pub mod connection;
pub mod event;

pub use event::{actions, ClientMessage, HubEvent, Scope};

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// 연결 핸들 (UUIDv7)
pub type ConnectionId = Uuid;

/// 코디네이터가 연결에 이벤트를 밀어 넣는 송신 큐
pub type Outbound = mpsc::Sender<HubEvent>;

/// 허브 에러
///
/// `Transport`는 연결 하나의 읽기/쓰기 실패로, 그 연결을 닫는 것으로 끝납니다.
/// 발행한 쪽이나 다른 연결로는 전파되지 않습니다.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("broadcast hub is not running")]
    Unavailable,

    #[error("connection transport failed: {0}")]
    Transport(String),
}

enum Command {
    Register {
        id: ConnectionId,
        scope: Scope,
        outbound: Outbound,
    },
    Unregister {
        id: ConnectionId,
    },
    Publish(HubEvent),
    Inbound {
        from: ConnectionId,
        message: ClientMessage,
    },
    Count(oneshot::Sender<usize>),
}

/// 허브 핸들. `AppState`에 넣어 공유합니다.
///
/// clone해도 같은 코디네이터를 가리킵니다 (내부는 채널 Sender 하나).
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<Command>,
}

impl Hub {
    /// 코디네이터 태스크를 띄우고 핸들을 돌려줍니다.
    ///
    /// Tokio 런타임 안에서 호출해야 합니다.
    pub fn spawn() -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        tokio::spawn(Coordinator::default().run(receiver));
        Self { commands }
    }

    /// 연결을 등록합니다. 코디네이터가 등록을 처리하면 그 연결에만 `connected` 이벤트를 보냅니다.
    pub fn register(&self, scope: Scope, outbound: Outbound) -> Result<ConnectionId, HubError> {
        let id = Uuid::now_v7();
        self.send(Command::Register {
            id,
            scope,
            outbound,
        })?;
        Ok(id)
    }

    /// 연결을 레지스트리에서 뺍니다. 이미 빠진 연결이면 아무 일도 없습니다.
    pub fn unregister(&self, id: ConnectionId) {
        // 코디네이터가 없으면 레지스트리도 없으므로 무시해도 됩니다.
        let _ = self.send(Command::Unregister { id });
    }

    /// 이벤트를 큐에 넣습니다. 전달을 기다리지 않습니다.
    pub fn publish(&self, event: HubEvent) -> Result<(), HubError> {
        self.send(Command::Publish(event))
    }

    /// 연결에서 읽은 클라이언트 메시지를 코디네이터로 넘깁니다.
    pub fn forward(&self, from: ConnectionId, message: ClientMessage) -> Result<(), HubError> {
        self.send(Command::Inbound { from, message })
    }

    /// 현재 등록된 연결 수. 앞서 넣은 명령이 모두 처리된 뒤의 값입니다.
    pub async fn connection_count(&self) -> Result<usize, HubError> {
        let (reply, count) = oneshot::channel();
        self.send(Command::Count(reply))?;
        count.await.map_err(|_| HubError::Unavailable)
    }

    fn send(&self, command: Command) -> Result<(), HubError> {
        self.commands.send(command).map_err(|_| HubError::Unavailable)
    }

    /// 코디네이터가 없는 핸들. 발행 실패를 흉내 낼 때 씁니다.
    #[cfg(test)]
    pub fn detached() -> Self {
        let (commands, _) = mpsc::unbounded_channel();
        Self { commands }
    }
}

struct Connection {
    scope: Scope,
    outbound: Outbound,
}

/// 레지스트리를 소유하는 단일 태스크
#[derive(Default)]
struct Coordinator {
    connections: HashMap<ConnectionId, Connection>,
}

impl Coordinator {
    /// 모든 `Hub` 핸들이 drop될 때까지 (즉 프로세스가 끝날 때까지) 돕니다.
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("broadcast hub started");
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        tracing::debug!(
            connections = self.connections.len(),
            "broadcast hub stopped"
        );
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Register {
                id,
                scope,
                outbound,
            } => self.register(id, scope, outbound),
            Command::Unregister { id } => self.close(id),
            Command::Publish(event) => self.broadcast(&event),
            Command::Inbound { from, message } => self.inbound(from, message),
            Command::Count(reply) => {
                let _ = reply.send(self.connections.len());
            }
        }
    }

    fn register(&mut self, id: ConnectionId, scope: Scope, outbound: Outbound) {
        if let Err(e) = outbound.try_send(HubEvent::connected()) {
            tracing::warn!(connection = %id, error = %e, "connection dropped before acknowledgement");
            return;
        }
        tracing::info!(connection = %id, ?scope, "connection registered");
        self.connections.insert(id, Connection { scope, outbound });
    }

    fn close(&mut self, id: ConnectionId) {
        if self.connections.remove(&id).is_some() {
            tracing::info!(connection = %id, "connection unregistered");
        }
    }

    /// 범위에 맞는 모든 연결에 이벤트를 보냅니다.
    ///
    /// 보내기에 실패한 연결은 `retain` 안에서 바로 빠지고, 나머지 연결은 계속 받습니다.
    fn broadcast(&mut self, event: &HubEvent) {
        tracing::debug!(action = %event.action, session_id = ?event.session_id, "broadcasting");
        self.connections.retain(|id, connection| {
            if !connection.scope.accepts(event) {
                return true;
            }
            match connection.outbound.try_send(event.clone()) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(
                        connection = %id,
                        action = %event.action,
                        error = %e,
                        "write failed, closing connection"
                    );
                    false
                }
            }
        });
    }

    /// 클라이언트가 보낸 action을 기록하고, 보낸 연결의 범위 안에서 다시 뿌립니다.
    fn inbound(&mut self, from: ConnectionId, message: ClientMessage) {
        let Some(scope) = self.connections.get(&from).map(|c| c.scope) else {
            tracing::debug!(connection = %from, "message from unregistered connection ignored");
            return;
        };
        tracing::info!(connection = %from, action = %message.action, "client action received");

        self.broadcast(&HubEvent::relayed(message, scope.session_id()));
    }
}
