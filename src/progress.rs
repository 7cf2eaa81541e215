//! Per-mission progress: answers, feedback and score for one learner, plus
//! the guarded transitions between in-progress, completed and failed.
//!
//! A record is created lazily (empty, zero score) on first touch of a
//! mission and wiped wholesale on reset. Transitions never panic: every
//! violated guard is a typed error the caller turns into an inline message.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Mission, Question};

/// Where a mission currently stands. A single tag, so "completed and failed
/// at the same time" cannot be represented.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionPhase {
  InProgress,
  Completed,
  Failed,
}

/// Invalid transitions and lookups on a mission's progress.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
  #[error("question {0} is not part of this mission")]
  UnknownQuestion(String),
  #[error("option {0} does not exist on this question")]
  UnknownOption(String),
  #[error("question {0} does not take an option selection")]
  NotAChoice(String),
  #[error("question {0} is already answered")]
  AlreadyAnswered(String),
  #[error("mission is locked after a wrong choice; reset it to continue")]
  MissionLocked,
  #[error("reset is only available after a failed choice")]
  ResetNotAllowed,
}

/// What recording a multiple-choice selection did to the mission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChoiceRecorded {
  pub correct: bool,
  pub explanation: String,
  pub just_completed: bool,
}

/// Mutable progress record for one learner on one mission.
#[derive(Clone, Debug, Serialize)]
pub struct MissionState {
  pub mission_id: String,
  /// Question id -> literal answer text or selected option id. A question
  /// is answered iff its id is present here.
  pub answers: HashMap<String, String>,
  /// Question id -> feedback string shown next to the answer.
  pub feedback: HashMap<String, String>,
  /// Running total; only accepted open-ended submissions add to it.
  pub score: u32,
  pub phase: MissionPhase,
  /// Bumped on every reset. In-flight grading captures the epoch before the
  /// call and discards its result when the value moved.
  pub epoch: u64,
}

impl MissionState {
  /// Fresh empty record for a mission.
  pub fn new(mission_id: &str) -> Self {
    Self {
      mission_id: mission_id.to_string(),
      answers: HashMap::new(),
      feedback: HashMap::new(),
      score: 0,
      phase: MissionPhase::InProgress,
      epoch: 0,
    }
  }

  pub fn is_answered(&self, qid: &str) -> bool {
    self.answers.contains_key(qid)
  }

  /// Guard shared by every answer-recording transition. Returns the question
  /// so callers never look it up twice.
  fn recordable<'m>(&self, mission: &'m Mission, qid: &str) -> Result<&'m Question, ProgressError> {
    if self.phase == MissionPhase::Failed {
      return Err(ProgressError::MissionLocked);
    }
    let q = mission
      .question(qid)
      .ok_or_else(|| ProgressError::UnknownQuestion(qid.to_string()))?;
    if self.is_answered(qid) {
      return Err(ProgressError::AlreadyAnswered(qid.to_string()));
    }
    Ok(q)
  }

  /// Record a multiple-choice selection. Single shot: the option id and its
  /// explanation are stored, and a wrong option locks the mission until
  /// reset. Score never changes here.
  pub fn record_choice(
    &mut self,
    mission: &Mission,
    qid: &str,
    option_id: &str,
  ) -> Result<ChoiceRecorded, ProgressError> {
    let q = self.recordable(mission, qid)?;
    let options = q
      .options()
      .ok_or_else(|| ProgressError::NotAChoice(qid.to_string()))?;
    let opt = options
      .iter()
      .find(|o| o.id == option_id)
      .ok_or_else(|| ProgressError::UnknownOption(option_id.to_string()))?;

    let correct = opt.is_correct;
    let explanation = opt.explanation.clone();
    self.answers.insert(qid.to_string(), option_id.to_string());
    self.feedback.insert(qid.to_string(), explanation.clone());
    if !correct {
      self.phase = MissionPhase::Failed;
    }
    let just_completed = self.recompute_completion(mission);
    Ok(ChoiceRecorded { correct, explanation, just_completed })
  }

  /// Record an accepted open-ended answer with its score delta. Pattern
  /// acceptance and remote grading (including the zero-credit degrade) both
  /// land here. Returns whether this submission completed the mission.
  pub fn record_accepted(
    &mut self,
    mission: &Mission,
    qid: &str,
    answer: &str,
    feedback: &str,
    delta: u32,
  ) -> Result<bool, ProgressError> {
    self.recordable(mission, qid)?;
    self.answers.insert(qid.to_string(), answer.to_string());
    self.feedback.insert(qid.to_string(), feedback.to_string());
    self.score = self.score.saturating_add(delta);
    Ok(self.recompute_completion(mission))
  }

  /// Completion check, run after every recording transition. Flips the phase
  /// to Completed once everything is answered and reports the flip exactly
  /// once; recomputing on an already-completed (or failed) mission reports
  /// false.
  pub fn recompute_completion(&mut self, mission: &Mission) -> bool {
    if self.phase != MissionPhase::InProgress {
      return false;
    }
    if mission.questions.iter().all(|q| self.is_answered(&q.id)) {
      self.phase = MissionPhase::Completed;
      return true;
    }
    false
  }

  /// Wipe progress after a failed choice: answers and feedback cleared,
  /// score zeroed, phase back to InProgress. The question list is untouched.
  pub fn reset(&mut self) -> Result<(), ProgressError> {
    if self.phase != MissionPhase::Failed {
      return Err(ProgressError::ResetNotAllowed);
    }
    self.answers.clear();
    self.feedback.clear();
    self.score = 0;
    self.phase = MissionPhase::InProgress;
    self.epoch += 1;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ChoiceOption, Mission, MissionSource, Question, QuestionKind};

  fn option(id: &str, correct: bool, explanation: &str) -> ChoiceOption {
    ChoiceOption {
      id: id.into(),
      text: format!("option {id}"),
      is_correct: correct,
      explanation: explanation.into(),
    }
  }

  fn mission() -> Mission {
    Mission {
      id: "m1".into(),
      title: "Test mission".into(),
      description: String::new(),
      difficulty: Default::default(),
      duration_minutes: 10,
      source: MissionSource::Seed,
      modules: vec![],
      questions: vec![
        Question {
          id: "q1".into(),
          prompt: "pick one".into(),
          context: None,
          kind: QuestionKind::MultipleChoice {
            options: vec![
              option("a", true, "right, because"),
              option("b", false, "wrong, because"),
            ],
          },
        },
        Question {
          id: "q2".into(),
          prompt: "type it".into(),
          context: None,
          kind: QuestionKind::OpenEnded { validation: None, grading_criteria: None },
        },
      ],
    }
  }

  #[test]
  fn wrong_choice_locks_the_mission() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    let rec = st.record_choice(&m, "q1", "b").expect("recorded");
    assert!(!rec.correct);
    assert_eq!(rec.explanation, "wrong, because");
    assert_eq!(st.phase, MissionPhase::Failed);
    assert_eq!(st.answers.get("q1").map(String::as_str), Some("b"));

    // Locked missions reject every further answer.
    assert_eq!(
      st.record_accepted(&m, "q2", "x", "fb", 10),
      Err(ProgressError::MissionLocked)
    );
  }

  #[test]
  fn correct_choice_keeps_the_mission_open() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    let rec = st.record_choice(&m, "q1", "a").expect("recorded");
    assert!(rec.correct);
    assert!(!rec.just_completed);
    assert_eq!(st.phase, MissionPhase::InProgress);
    assert_eq!(st.score, 0);
  }

  #[test]
  fn accepted_answers_accumulate_score() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    st.record_accepted(&m, "q2", "answer", "well done", 100).expect("recorded");
    assert_eq!(st.score, 100);
    assert_eq!(st.feedback.get("q2").map(String::as_str), Some("well done"));
  }

  #[test]
  fn completion_is_reported_exactly_once() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    let rec = st.record_choice(&m, "q1", "a").expect("recorded");
    assert!(!rec.just_completed);
    let just = st.record_accepted(&m, "q2", "answer", "fb", 50).expect("recorded");
    assert!(just);
    assert_eq!(st.phase, MissionPhase::Completed);

    // Recomputing on later renders must not re-fire.
    assert!(!st.recompute_completion(&m));
    assert!(!st.recompute_completion(&m));
  }

  #[test]
  fn double_answer_is_rejected() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    st.record_choice(&m, "q1", "a").expect("recorded");
    assert_eq!(
      st.record_choice(&m, "q1", "b"),
      Err(ProgressError::AlreadyAnswered("q1".into()))
    );
    st.record_accepted(&m, "q2", "first", "fb", 10).expect("recorded");
    assert_eq!(
      st.record_accepted(&m, "q2", "second", "fb", 10),
      Err(ProgressError::AlreadyAnswered("q2".into()))
    );
    assert_eq!(st.score, 10);
  }

  #[test]
  fn unknown_ids_are_rejected() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    assert_eq!(
      st.record_accepted(&m, "nope", "x", "fb", 10),
      Err(ProgressError::UnknownQuestion("nope".into()))
    );
    assert_eq!(
      st.record_choice(&m, "q1", "zz"),
      Err(ProgressError::UnknownOption("zz".into()))
    );
    assert_eq!(
      st.record_choice(&m, "q2", "a"),
      Err(ProgressError::NotAChoice("q2".into()))
    );
    assert!(st.answers.is_empty());
  }

  #[test]
  fn reset_restores_initial_state_and_bumps_epoch() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    st.record_accepted(&m, "q2", "answer", "fb", 100).expect("recorded");
    st.record_choice(&m, "q1", "b").expect("recorded");
    assert_eq!(st.phase, MissionPhase::Failed);

    st.reset().expect("reset");
    assert!(st.answers.is_empty());
    assert!(st.feedback.is_empty());
    assert_eq!(st.score, 0);
    assert_eq!(st.phase, MissionPhase::InProgress);
    assert_eq!(st.epoch, 1);

    // And the mission is playable again.
    st.record_choice(&m, "q1", "a").expect("recorded");
  }

  #[test]
  fn reset_requires_a_failed_mission() {
    let m = mission();
    let mut st = MissionState::new(&m.id);
    assert_eq!(st.reset(), Err(ProgressError::ResetNotAllowed));
    st.record_choice(&m, "q1", "a").expect("recorded");
    assert_eq!(st.reset(), Err(ProgressError::ResetNotAllowed));
    st.record_accepted(&m, "q2", "x", "fb", 0).expect("recorded");
    // Completed is terminal; reset stays unavailable.
    assert_eq!(st.reset(), Err(ProgressError::ResetNotAllowed));
  }
}
