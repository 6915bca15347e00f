//! `GET /updates` – WebSocket stream of `FeedUpdated` notifications.

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use swapit_feed_sdk::objects::{FeedUpdatedPayload, WsCloseCode, WsServerMessage};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// Upgrades the connection and pushes a `feed_updated` frame for every
/// change. A subscriber that falls behind gets a single `lagged` frame and
/// should re-read the feed.
pub(super) async fn feed_updates_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_feed_ws(socket, state))
}

async fn handle_feed_ws(mut socket: WebSocket, state: AppState) {
    let mut updates = BroadcastStream::new(state.feed_updated_tx.subscribe());
    let mut shutdown_rx = state.shutdown_rx.clone();
    tracing::debug!("WS: feed subscriber connected");

    loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    let _ = socket
                        .send(Message::Close(Some(CloseFrame {
                            code: WsCloseCode::GOING_AWAY,
                            reason: "server shutting down".into(),
                        })))
                        .await;
                    return;
                }
            }

            next = updates.next() => {
                let msg = match next {
                    Some(Ok(update)) => WsServerMessage::FeedUpdated {
                        update: FeedUpdatedPayload::from(&update),
                    },
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        tracing::warn!(skipped, "WS: feed subscriber lagged");
                        WsServerMessage::Lagged { skipped }
                    }
                    None => break,
                };
                if send_json(&mut socket, &msg).await.is_err() {
                    return;
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                        tracing::debug!("WS: feed subscriber disconnected");
                        return;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket.send(Message::Close(None)).await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
