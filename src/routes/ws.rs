//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "cybered_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "cybered_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "cybered_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => {
            debug!(target: "cybered_backend", raw = %trunc_for_log(&txt, 200), "WS message did not parse");
            ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }
          }
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "cybered_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "cybered_backend", "WebSocket disconnected");
}

/// Map a logic result onto the wire: the success variant, or `Error` with the
/// failure rendered as an inline message.
fn or_error<T>(result: Result<T, ApiError>, wrap: impl FnOnce(T) -> ServerWsMessage) -> ServerWsMessage {
  match result {
    Ok(v) => wrap(v),
    Err(e) => ServerWsMessage::Error { message: e.to_string() },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListMissions => {
      let list = list_missions(state).await;
      ServerWsMessage::Missions { missions: list.missions }
    }

    ClientWsMessage::SelectMission { mission_id } => {
      tracing::info!(target: "mission", mission = %mission_id, "WS mission selected");
      or_error(select_mission(state, &mission_id).await, |view| ServerWsMessage::MissionView { view })
    }

    ClientWsMessage::OpenChallenges { mission_id } => {
      or_error(open_challenges(state, &mission_id).await, |view| ServerWsMessage::MissionView { view })
    }

    ClientWsMessage::SubmitChoice { mission_id, question_id, option_id } => {
      let res = select_choice(state, &mission_id, &question_id, &option_id).await;
      if let Ok(out) = &res {
        tracing::info!(target: "mission", mission = %mission_id, question = %question_id, correct = out.correct, "WS choice recorded");
      }
      or_error(res, |result| ServerWsMessage::ChoiceResult { result })
    }

    ClientWsMessage::SubmitAnswer { mission_id, question_id, answer } => {
      let res = submit_answer(state, &mission_id, &question_id, &answer).await;
      if let Ok(out) = &res {
        tracing::info!(target: "mission", mission = %mission_id, question = %question_id, status = ?out.status, "WS answer evaluated");
      }
      or_error(res, |result| ServerWsMessage::AnswerResult { result })
    }

    ClientWsMessage::Advance { mission_id } => {
      or_error(advance(state, &mission_id).await, |nav| ServerWsMessage::Position { nav })
    }

    ClientWsMessage::ResetMission { mission_id } => {
      tracing::info!(target: "mission", mission = %mission_id, "WS reset requested");
      or_error(reset_mission(state, &mission_id).await, |result| ServerWsMessage::MissionReset { result })
    }

    ClientWsMessage::MentorMessage { history, text } => {
      let reply = mentor_reply(state, &history, &text).await;
      ServerWsMessage::MentorReply { text: reply }
    }
  }
}
