//! # 라이브 연결 드라이버
//!
//! WebSocket 하나를 허브에 붙이는 코드입니다.
//!
//! ```text
//!            ┌─ 읽기 태스크: 소켓 → ClientMessage → hub.forward()
//! 소켓 split ┤
//!            └─ 쓰기 루프: 송신 큐(mpsc) → JSON 텍스트 프레임 → 소켓
//! ```
//!
//! 둘 중 하나가 끝나면(읽기 실패, 쓰기 실패, 허브가 연결을 뺌, 클라이언트 close)
//! 다른 쪽도 멈추고 연결을 레지스트리에서 뺍니다.
//! 소켓 타입은 제네릭이라 테스트에서는 실제 네트워크 없이 채널로 대신합니다.

use std::fmt::Display;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;

use super::{ClientMessage, ConnectionId, Hub, HubError, HubEvent, Scope};

/// 연결 하나를 끝날 때까지 처리합니다.
///
/// `outbound_buffer`는 이 연결의 송신 큐 크기입니다. 큐가 가득 차면
/// 코디네이터가 이 연결을 느린 연결로 보고 레지스트리에서 뺍니다.
pub async fn serve<S, E>(socket: S, hub: Hub, scope: Scope, outbound_buffer: usize)
where
    S: Stream<Item = Result<Message, E>> + Sink<Message, Error = E> + Send + 'static,
    E: Display + Send + 'static,
{
    let (sink, stream) = socket.split();
    let (outbound, outbound_rx) = mpsc::channel(outbound_buffer);

    let id = match hub.register(scope, outbound) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "cannot register live connection");
            return;
        }
    };

    let mut reader = tokio::spawn(read_loop(stream, hub.clone(), id));

    tokio::select! {
        result = write_loop(sink, outbound_rx) => {
            if let Err(e) = result {
                tracing::warn!(connection = %id, error = %e, "live connection write failed");
            }
            // 읽기 태스크가 소켓을 붙잡고 있지 않도록 중단
            reader.abort();
        }
        _ = &mut reader => {}
    }

    hub.unregister(id);
}

/// 소켓에서 클라이언트 메시지를 읽어 허브로 넘깁니다.
///
/// 형식이 잘못된 텍스트는 기록만 하고 건너뜁니다.
/// 읽기 에러, close 프레임, 스트림 종료, 허브 종료 중 하나가 오면 끝납니다.
pub async fn read_loop<S, E>(mut stream: S, hub: Hub, id: ConnectionId)
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let message = match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(message) => message,
                    Err(e) => {
                        tracing::warn!(connection = %id, error = %e, "ignoring malformed client payload");
                        continue;
                    }
                };
                if hub.forward(id, message).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection = %id, "client closed connection");
                break;
            }
            // ping/pong은 axum이 처리하고, 바이너리는 쓰지 않음
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(connection = %id, error = %e, "live connection read failed");
                break;
            }
        }
    }
}

/// 송신 큐의 이벤트를 JSON 텍스트 프레임으로 소켓에 씁니다.
///
/// 큐가 닫히면(허브가 연결을 뺌) 소켓을 닫고 `Ok(())`로 끝납니다.
pub async fn write_loop<S>(
    mut sink: S,
    mut outbound: mpsc::Receiver<HubEvent>,
) -> Result<(), HubError>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    while let Some(event) = outbound.recv().await {
        let text = serde_json::to_string(&event)
            .map_err(|e| HubError::Transport(e.to_string()))?;
        sink.send(Message::text(text))
            .await
            .map_err(|e| HubError::Transport(e.to_string()))?;
    }

    let _ = sink.close().await;
    Ok(())
}
