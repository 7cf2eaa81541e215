//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Submitting typed answers (pattern locks check locally; criteria locks
//!     go to the grading service, with a zero-credit degrade when it is
//!     unreachable)
//!   - Recording multiple-choice selections (a wrong pick fails the mission)
//!   - Navigator moves (select mission, open challenges, advance, reset)
//!   - Mentor chat with a canned local fallback
//!
//! Every mutating reply carries a fresh progress snapshot and the navigator
//! position so the client re-renders from server truth.

use tracing::{error, info, instrument, warn};

use crate::domain::{ChatTurn, Mission, QuestionKind};
use crate::error::ApiError;
use crate::progress::{MissionPhase, MissionState, ProgressError};
use crate::protocol::{
  self, AnswerOut, AnswerStatus, ChoiceOut, MissionListOut, MissionViewOut, NavOut, ResetOut,
};
use crate::state::AppState;
use crate::validator::{check_pattern, PatternOutcome};

/// Score awarded when a pattern lock accepts the typed answer.
pub const PATTERN_ACCEPT_SCORE: u32 = 100;

/// Progress + navigator view for a reply, read after the mutation settled.
async fn snapshot_outs(state: &AppState, mission: &Mission) -> (protocol::MissionStateOut, NavOut) {
  let ms = state.progress_snapshot(&mission.id).await;
  let nav = state.nav.read().await;
  let nav_out = protocol::nav_out(&nav, mission, &ms);
  (protocol::state_out(&ms), nav_out)
}

/// Submit a typed answer for an open-ended or code-fix lock.
///
/// Pattern locks are decided locally: a match books the fixed acceptance
/// score, a mismatch surfaces the authored error without consuming the turn,
/// and a pattern that fails to compile is reported as a generic validation
/// error. Locks without a pattern go to the grading service, one call in
/// flight per question; a result that comes back after a reset is discarded.
#[instrument(
  level = "info",
  skip(state, answer),
  fields(%mission_id, %question_id, answer_len = answer.len())
)]
pub async fn submit_answer(
  state: &AppState,
  mission_id: &str,
  question_id: &str,
  answer: &str,
) -> Result<AnswerOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  let question = mission
    .question(question_id)
    .ok_or_else(|| ProgressError::UnknownQuestion(question_id.to_string()))?;
  if matches!(question.kind, QuestionKind::MultipleChoice { .. }) {
    return Err(ApiError::BadRequest(
      "this lock takes an option choice, not a typed answer".into(),
    ));
  }

  let answer = answer.trim();
  if answer.is_empty() {
    let (state_out, nav_out) = snapshot_outs(state, mission).await;
    return Ok(AnswerOut {
      mission_id: mission_id.to_string(),
      question_id: question_id.to_string(),
      status: AnswerStatus::Rejected,
      score_delta: 0,
      feedback: "Enter an answer before submitting.".to_string(),
      mission_completed: false,
      state: state_out,
      nav: nav_out,
    });
  }

  // Cheap early guard; record_accepted re-checks under the write lock.
  {
    let guard = state.progress.read().await;
    if let Some(ms) = guard.get(mission_id) {
      if ms.phase == MissionPhase::Failed {
        return Err(ProgressError::MissionLocked.into());
      }
      if ms.is_answered(question_id) {
        return Err(ProgressError::AlreadyAnswered(question_id.to_string()).into());
      }
    }
  }

  if let Some(check) = question.validation() {
    return submit_pattern(state, mission, question_id, answer, check).await;
  }
  submit_graded(state, mission, question_id, answer).await
}

async fn submit_pattern(
  state: &AppState,
  mission: &Mission,
  question_id: &str,
  answer: &str,
  check: &crate::domain::PatternCheck,
) -> Result<AnswerOut, ApiError> {
  let (status, delta, feedback, completed) = match check_pattern(&check.pattern, answer) {
    PatternOutcome::Match => {
      let feedback = state.prompts.pattern_success_feedback.clone();
      let mut guard = state.progress.write().await;
      let ms = guard
        .entry(mission.id.clone())
        .or_insert_with(|| MissionState::new(&mission.id));
      let completed =
        ms.record_accepted(mission, question_id, answer, &feedback, PATTERN_ACCEPT_SCORE)?;
      if completed {
        info!(target: "mission", mission = %mission.id, score = ms.score, "mission completed");
      }
      (AnswerStatus::Accepted, PATTERN_ACCEPT_SCORE, feedback, completed)
    }
    PatternOutcome::NoMatch => {
      let msg = check
        .error_message
        .clone()
        .unwrap_or_else(|| state.prompts.pattern_default_error.clone());
      (AnswerStatus::Rejected, 0, msg, false)
    }
    PatternOutcome::Invalid(e) => {
      error!(target: "mission", mission = %mission.id, question = %question_id, error = %e, "answer pattern failed to compile");
      let msg = "This lock's answer check is misconfigured; your input was not evaluated.".to_string();
      (AnswerStatus::Rejected, 0, msg, false)
    }
  };

  let (state_out, nav_out) = snapshot_outs(state, mission).await;
  Ok(AnswerOut {
    mission_id: mission.id.clone(),
    question_id: question_id.to_string(),
    status,
    score_delta: delta,
    feedback,
    mission_completed: completed,
    state: state_out,
    nav: nav_out,
  })
}

async fn submit_graded(
  state: &AppState,
  mission: &Mission,
  question_id: &str,
  answer: &str,
) -> Result<AnswerOut, ApiError> {
  let question = mission
    .question(question_id)
    .ok_or_else(|| ProgressError::UnknownQuestion(question_id.to_string()))?;
  let key = (mission.id.clone(), question_id.to_string());

  // One grading call in flight per lock.
  {
    let mut inflight = state.grading_inflight.write().await;
    if !inflight.insert(key.clone()) {
      let (state_out, nav_out) = snapshot_outs(state, mission).await;
      return Ok(AnswerOut {
        mission_id: mission.id.clone(),
        question_id: question_id.to_string(),
        status: AnswerStatus::Pending,
        score_delta: 0,
        feedback: "This answer is already being graded. Hold on.".to_string(),
        mission_completed: false,
        state: state_out,
        nav: nav_out,
      });
    }
  }

  let epoch = state.progress_snapshot(&mission.id).await.epoch;

  let graded = match &state.openai {
    Some(oa) => oa.grade_answer(&state.prompts, question, answer).await,
    None => Err("no grading service configured".to_string()),
  };

  {
    let mut inflight = state.grading_inflight.write().await;
    inflight.remove(&key);
  }

  let (status, delta, feedback, completed) = {
    let mut guard = state.progress.write().await;
    let ms = guard
      .entry(mission.id.clone())
      .or_insert_with(|| MissionState::new(&mission.id));

    // The learner may have failed and reset while the call was out. A result
    // graded against the old run must not leak into the new one.
    if ms.epoch != epoch || ms.is_answered(question_id) || ms.phase == MissionPhase::Failed {
      warn!(target: "mission", mission = %mission.id, question = %question_id, "discarding grading result for a stale run");
      let msg = "The mission changed while this answer was being graded. Submit it again.".to_string();
      (AnswerStatus::Discarded, 0, msg, false)
    } else {
      let (delta, feedback) = match graded {
        Ok(grade) => {
          let feedback = if grade.feedback.trim().is_empty() {
            "Answer graded.".to_string()
          } else {
            grade.feedback
          };
          (grade.score, feedback)
        }
        Err(e) => {
          error!(target: "mission", mission = %mission.id, question = %question_id, error = %e, "grading unavailable; recording without credit");
          (0, state.prompts.grader_unavailable_feedback.clone())
        }
      };
      let completed = ms.record_accepted(mission, question_id, answer, &feedback, delta)?;
      if completed {
        info!(target: "mission", mission = %mission.id, score = ms.score, "mission completed");
      }
      (AnswerStatus::Accepted, delta, feedback, completed)
    }
  };

  let (state_out, nav_out) = snapshot_outs(state, mission).await;
  Ok(AnswerOut {
    mission_id: mission.id.clone(),
    question_id: question_id.to_string(),
    status,
    score_delta: delta,
    feedback,
    mission_completed: completed,
    state: state_out,
    nav: nav_out,
  })
}

/// Record a multiple-choice selection. A wrong option fails the mission.
#[instrument(level = "info", skip(state), fields(%mission_id, %question_id, %option_id))]
pub async fn select_choice(
  state: &AppState,
  mission_id: &str,
  question_id: &str,
  option_id: &str,
) -> Result<ChoiceOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;

  let recorded = {
    let mut guard = state.progress.write().await;
    let ms = guard
      .entry(mission_id.to_string())
      .or_insert_with(|| MissionState::new(mission_id));
    let recorded = ms.record_choice(mission, question_id, option_id)?;
    if !recorded.correct {
      info!(target: "mission", mission = %mission_id, question = %question_id, "wrong choice; mission failed");
    }
    if recorded.just_completed {
      info!(target: "mission", mission = %mission_id, score = ms.score, "mission completed");
    }
    recorded
  };

  let (state_out, nav_out) = snapshot_outs(state, mission).await;
  Ok(ChoiceOut {
    mission_id: mission_id.to_string(),
    question_id: question_id.to_string(),
    correct: recorded.correct,
    explanation: recorded.explanation,
    mission_completed: recorded.just_completed,
    state: state_out,
    nav: nav_out,
  })
}

/// Move to the next lock, if the current one is answered and another exists.
#[instrument(level = "info", skip(state), fields(%mission_id))]
pub async fn advance(state: &AppState, mission_id: &str) -> Result<NavOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  let ms = state.progress_snapshot(mission_id).await;

  let mut nav = state.nav.write().await;
  if nav.mission_id != mission.id {
    nav.select_mission(&mission.id);
  }
  nav.advance(mission, &ms);
  Ok(protocol::nav_out(&nav, mission, &ms))
}

/// Select a mission: navigator rewinds to the first lock on the Learn tab.
#[instrument(level = "info", skip(state), fields(%mission_id))]
pub async fn select_mission(state: &AppState, mission_id: &str) -> Result<MissionViewOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  {
    let mut nav = state.nav.write().await;
    nav.select_mission(&mission.id);
  }
  mission_view(state, mission_id).await
}

/// Flip the navigator to the Challenge tab for this mission.
#[instrument(level = "info", skip(state), fields(%mission_id))]
pub async fn open_challenges(state: &AppState, mission_id: &str) -> Result<MissionViewOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  {
    let mut nav = state.nav.write().await;
    if nav.mission_id != mission.id {
      nav.select_mission(&mission.id);
    }
    nav.open_challenges();
  }
  mission_view(state, mission_id).await
}

/// Wipe a failed run and start the mission over from the study material.
#[instrument(level = "info", skip(state), fields(%mission_id))]
pub async fn reset_mission(state: &AppState, mission_id: &str) -> Result<ResetOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  {
    let mut guard = state.progress.write().await;
    let ms = guard
      .entry(mission_id.to_string())
      .or_insert_with(|| MissionState::new(mission_id));
    ms.reset()?;
    info!(target: "mission", mission = %mission_id, epoch = ms.epoch, "mission reset");
  }
  {
    let mut nav = state.nav.write().await;
    if nav.mission_id == mission.id {
      nav.reset();
    } else {
      nav.select_mission(&mission.id);
    }
  }

  let (state_out, nav_out) = snapshot_outs(state, mission).await;
  Ok(ResetOut { mission_id: mission_id.to_string(), state: state_out, nav: nav_out })
}

/// Full mission view: modules, redacted questions, progress, navigator.
pub async fn mission_view(state: &AppState, mission_id: &str) -> Result<MissionViewOut, ApiError> {
  let mission = state
    .mission(mission_id)
    .ok_or_else(|| ApiError::MissionNotFound(mission_id.to_string()))?;
  let ms = state.progress_snapshot(mission_id).await;
  let nav = state.nav.read().await;
  Ok(protocol::mission_view_out(mission, &ms, &nav))
}

/// Catalog with per-mission progress summaries for the sidebar.
pub async fn list_missions(state: &AppState) -> MissionListOut {
  let guard = state.progress.read().await;
  let mut missions = Vec::with_capacity(state.missions.len());
  for m in state.missions.iter() {
    let snap = match guard.get(&m.id) {
      Some(s) => s.clone(),
      None => MissionState::new(&m.id),
    };
    missions.push(protocol::summary_out(m, &snap));
  }
  MissionListOut { missions }
}

/// Mentor chat. Falls back to a canned line when no model is configured or
/// the call fails; the channel itself never errors.
#[instrument(
  level = "info",
  skip(state, history, message),
  fields(history_len = history.len(), message_len = message.len())
)]
pub async fn mentor_reply(state: &AppState, history: &[ChatTurn], message: &str) -> String {
  if message.trim().is_empty() {
    return "Ask me something about the mission and I'll point you at the right module.".to_string();
  }
  if let Some(oa) = &state.openai {
    match oa.mentor_reply(&state.prompts, history, message).await {
      Ok(reply) => return reply,
      Err(e) => {
        error!(target: "cybered_backend", error = %e, "mentor call failed; using canned reply");
      }
    }
  }
  "The mentor channel is offline right now. Re-read the module notes; every lock is covered there."
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::MissionConfig;
  use crate::nav::MissionTab;

  fn state() -> AppState {
    AppState::new(MissionConfig::default(), None)
  }

  const MISSION: &str = "protocol-zero";

  #[tokio::test]
  async fn pattern_match_books_the_acceptance_score() {
    let st = state();
    let out = submit_answer(&st, MISSION, "q1", "AND").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Accepted);
    assert_eq!(out.score_delta, PATTERN_ACCEPT_SCORE);
    assert_eq!(out.state.score, PATTERN_ACCEPT_SCORE);
    assert_eq!(out.state.answers.get("q1").map(String::as_str), Some("AND"));
  }

  #[tokio::test]
  async fn pattern_mismatch_keeps_the_turn_and_surfaces_the_authored_error() {
    let st = state();
    let out = submit_answer(&st, MISSION, "q5", "80").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Rejected);
    assert_eq!(out.score_delta, 0);
    assert!(!out.feedback.is_empty());
    assert!(out.state.answers.is_empty());

    // Same lock accepts the right answer afterwards.
    let out = submit_answer(&st, MISSION, "q5", " 443 ").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Accepted);
    assert_eq!(out.state.answers.get("q5").map(String::as_str), Some("443"));
  }

  #[tokio::test]
  async fn empty_answer_is_rejected_without_touching_state() {
    let st = state();
    let out = submit_answer(&st, MISSION, "q1", "   ").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Rejected);
    assert!(out.state.answers.is_empty());
  }

  #[tokio::test]
  async fn typed_answer_to_a_choice_lock_is_a_bad_request() {
    let st = state();
    let err = submit_answer(&st, MISSION, "q2", "b").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
  }

  #[tokio::test]
  async fn non_compiling_pattern_rejects_with_the_generic_message() {
    // Lookahead is authorable in the bank but the engine cannot run it.
    let cfg: MissionConfig = toml::from_str(
      r#"
      [[missions]]
      id = "broken-lock"
      title = "Broken Lock"

      [[missions.questions]]
      id = "b1"
      kind = "open_ended"
      prompt = "Enter a strong password"
      [missions.questions.validation]
      pattern = "(?=.*[A-Z]).{8,}"
      "#,
    )
    .unwrap();
    let st = AppState::new(cfg, None);

    let out = submit_answer(&st, "broken-lock", "b1", "Password123").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Rejected);
    assert!(out.feedback.contains("not evaluated"));
    assert!(out.state.answers.is_empty());

    // Still retryable; the lock just never accepts until reauthored.
    let again = submit_answer(&st, "broken-lock", "b1", "another try").await.unwrap();
    assert_eq!(again.status, AnswerStatus::Rejected);
  }

  #[tokio::test]
  async fn grading_degrades_to_zero_credit_when_no_service_is_configured() {
    let st = state();
    let out = submit_answer(&st, MISSION, "q3", "Tr0ub4dor&3 rotated quarterly").await.unwrap();
    assert_eq!(out.status, AnswerStatus::Accepted);
    assert_eq!(out.score_delta, 0);
    assert_eq!(out.feedback, st.prompts.grader_unavailable_feedback);
    assert!(out.state.answers.contains_key("q3"));
  }

  #[tokio::test]
  async fn wrong_choice_fails_the_mission_and_reset_recovers_it() {
    let st = state();
    let out = select_choice(&st, MISSION, "q2", "a").await.unwrap();
    assert!(!out.correct);
    assert_eq!(out.state.phase, MissionPhase::Failed);

    // Locked mission rejects further answers.
    let err = submit_answer(&st, MISSION, "q1", "AND").await.unwrap_err();
    assert!(matches!(err, ApiError::Progress(ProgressError::MissionLocked)));

    let out = reset_mission(&st, MISSION).await.unwrap();
    assert_eq!(out.state.phase, MissionPhase::InProgress);
    assert_eq!(out.state.score, 0);
    assert!(out.state.answers.is_empty());
    assert_eq!(out.nav.index, 0);
    assert_eq!(out.nav.tab, MissionTab::Learn);
  }

  #[tokio::test]
  async fn reset_of_a_healthy_mission_is_refused() {
    let st = state();
    let err = reset_mission(&st, MISSION).await.unwrap_err();
    assert!(matches!(err, ApiError::Progress(ProgressError::ResetNotAllowed)));
  }

  #[tokio::test]
  async fn advance_needs_an_answered_question() {
    let st = state();
    select_mission(&st, MISSION).await.unwrap();

    let nav = advance(&st, MISSION).await.unwrap();
    assert_eq!(nav.index, 0);
    assert!(!nav.can_advance);

    submit_answer(&st, MISSION, "q1", "E").await.unwrap();
    let nav = advance(&st, MISSION).await.unwrap();
    assert_eq!(nav.index, 1);
  }

  #[tokio::test]
  async fn mission_switch_rewinds_the_navigator() {
    let st = state();
    select_mission(&st, MISSION).await.unwrap();
    open_challenges(&st, MISSION).await.unwrap();
    submit_answer(&st, MISSION, "q1", "AND").await.unwrap();
    advance(&st, MISSION).await.unwrap();

    let view = select_mission(&st, MISSION).await.unwrap();
    assert_eq!(view.nav.index, 0);
    assert_eq!(view.nav.tab, MissionTab::Learn);
  }

  #[tokio::test]
  async fn unknown_ids_map_to_not_found() {
    let st = state();
    assert!(matches!(
      submit_answer(&st, "nope", "q1", "x").await.unwrap_err(),
      ApiError::MissionNotFound(_)
    ));
    assert!(matches!(
      submit_answer(&st, MISSION, "q99", "x").await.unwrap_err(),
      ApiError::Progress(ProgressError::UnknownQuestion(_))
    ));
    assert!(matches!(
      select_choice(&st, MISSION, "q2", "zz").await.unwrap_err(),
      ApiError::Progress(ProgressError::UnknownOption(_))
    ));
  }

  #[tokio::test]
  async fn mentor_falls_back_to_a_canned_reply_without_a_model() {
    let st = state();
    let reply = mentor_reply(&st, &[], "what is phishing?").await;
    assert!(!reply.is_empty());
  }
}
