//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Fallible handlers return `Result<Json<T>, ApiError>`; the error side maps
//! to a status code plus a JSON `error` body.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_missions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::list_missions(&state).await)
}

#[instrument(level = "info", skip(state), fields(%q.mission_id))]
pub async fn http_get_mission(
  State(state): State<Arc<AppState>>,
  Query(q): Query<MissionQuery>,
) -> Result<Json<MissionViewOut>, ApiError> {
  Ok(Json(logic::mission_view(&state, &q.mission_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id))]
pub async fn http_post_select_mission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionIn>,
) -> Result<Json<MissionViewOut>, ApiError> {
  let view = logic::select_mission(&state, &body.mission_id).await?;
  info!(target: "mission", mission = %body.mission_id, "HTTP mission selected");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id))]
pub async fn http_post_open_challenges(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionIn>,
) -> Result<Json<MissionViewOut>, ApiError> {
  Ok(Json(logic::open_challenges(&state, &body.mission_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id))]
pub async fn http_post_reset_mission(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionIn>,
) -> Result<Json<ResetOut>, ApiError> {
  let out = logic::reset_mission(&state, &body.mission_id).await?;
  info!(target: "mission", mission = %body.mission_id, "HTTP mission reset");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id, %body.question_id, %body.option_id))]
pub async fn http_post_choice(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChoiceIn>,
) -> Result<Json<ChoiceOut>, ApiError> {
  let out = logic::select_choice(&state, &body.mission_id, &body.question_id, &body.option_id).await?;
  info!(target: "mission", mission = %body.mission_id, question = %body.question_id, correct = out.correct, "HTTP choice recorded");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id, %body.question_id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let out = logic::submit_answer(&state, &body.mission_id, &body.question_id, &body.answer).await?;
  info!(target: "mission", mission = %body.mission_id, question = %body.question_id, status = ?out.status, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.mission_id))]
pub async fn http_post_advance(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MissionIn>,
) -> Result<Json<NavOut>, ApiError> {
  Ok(Json(logic::advance(&state, &body.mission_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(history_len = body.history.len(), text_len = body.text.len()))]
pub async fn http_post_mentor_message(
  State(state): State<Arc<AppState>>,
  Json(body): Json<MentorIn>,
) -> impl IntoResponse {
  let reply = logic::mentor_reply(&state, &body.history, &body.text).await;
  Json(MentorOut { text: reply })
}
