//! WebSocket upgrade + message loop. Each connection owns one `LessonSession`;
//! client messages are parsed as JSON, applied to it, and answered with one or
//! more JSON messages (a snapshot, then any answer reports).

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::logic::{after_question_op, mount_lesson, profile_message, submit_question};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::{LessonSession, SessionError};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "lesson_quiz", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state), fields(conn = %Uuid::new_v4()))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "lesson_quiz", "WebSocket connected");
  let mut session = LessonSession::new();

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let replies = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "lesson_quiz", raw = %trunc_for_log(&txt, 200), "WS received");
            handle_client_ws(incoming, &state, &mut session)
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        };

        for reply in replies {
          let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
            serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
          });
          if let Err(e) = socket.send(Message::Text(out)).await {
            error!(target: "lesson_quiz", error = %e, "WS send error");
            return;
          }
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "lesson_quiz", "WebSocket disconnected");
}

fn handle_client_ws(msg: ClientWsMessage, state: &AppState, session: &mut LessonSession) -> Vec<ServerWsMessage> {
  let result: Result<Vec<ServerWsMessage>, SessionError> = match msg {
    ClientWsMessage::Ping => Ok(vec![ServerWsMessage::Pong]),

    ClientWsMessage::SelectGrade { grade } => session
      .profile
      .select_grade(&state.grades, &grade)
      .map(|()| vec![profile_message(&session.profile, state)]),

    ClientWsMessage::SelectSubject { subject } => session
      .profile
      .select_subject(&state.grades, &subject)
      .map(|()| vec![profile_message(&session.profile, state)]),

    ClientWsMessage::MountLesson { lesson_slug } => mount_lesson(state, session, &lesson_slug),

    ClientWsMessage::UnmountLesson => {
      session.unmount();
      Ok(vec![ServerWsMessage::Lesson { lesson: None }])
    }

    ClientWsMessage::Record { question_id, input } => session
      .record(&question_id, input)
      .and_then(|_| after_question_op(session, &question_id)),

    ClientWsMessage::Submit { question_id } => submit_question(session, &question_id),

    ClientWsMessage::Reset { question_id } => session
      .reset(&question_id)
      .and_then(|()| after_question_op(session, &question_id)),

    ClientWsMessage::Audio { question_id, event } => session
      .audio(&question_id, event)
      .and_then(|_| after_question_op(session, &question_id)),

    ClientWsMessage::ResourceFailed { question_id, url } => session
      .resource_failed(&question_id, &url)
      .and_then(|_| after_question_op(session, &question_id)),
  };

  result.unwrap_or_else(|e| {
    warn!(target: "lesson_quiz", error = %e, "WS request refused");
    vec![ServerWsMessage::Error { message: e.to_string() }]
  })
}
