//! Loading mission configuration (prompts + optional mission bank) from TOML,
//! and validating authored missions before they enter the catalog.
//!
//! See `MissionConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{Difficulty, LearningModule, Mission, MissionSource, Question, QuestionKind};
use crate::validator::{check_pattern, PatternOutcome};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct MissionConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub missions: Vec<MissionCfg>,
}

/// Mission entry accepted in TOML configuration. Ids are optional; missing
/// ones are backfilled with a fresh UUID at load.
#[derive(Clone, Debug, Deserialize)]
pub struct MissionCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: Difficulty,
  #[serde(default)] pub duration_minutes: u32,
  #[serde(default)] pub modules: Vec<LearningModule>,
  #[serde(default)] pub questions: Vec<Question>,
}

impl MissionCfg {
  pub fn into_mission(self) -> Mission {
    Mission {
      id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
      title: self.title,
      description: self.description,
      difficulty: self.difficulty,
      duration_minutes: self.duration_minutes,
      source: MissionSource::ConfigBank,
      modules: self.modules,
      questions: self.questions,
    }
  }
}

/// Prompts and canned lines used by grading, validation and the mentor.
/// Defaults are sensible for the built-in content; override any subset in
/// TOML to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  // Remote grading
  pub grading_system: String,
  pub grading_user_template: String,
  // Pattern locks
  pub pattern_success_feedback: String,
  pub pattern_default_error: String,
  // Zero-credit degrade when the grader is unreachable
  pub grader_unavailable_feedback: String,
  // Mentor chat
  pub mentor_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      grading_system: "You are a strict cybersecurity instructor grading a trainee's free-text answer. Respond ONLY with strict JSON.".into(),
      grading_user_template: "Question: {prompt}\nContext: {context}\nGrading criteria: {criteria}\nTrainee answer: {answer}\n\nReturn JSON {\"score\": number, \"feedback\": string}. Score 0-100 against the criteria. Feedback: 1-2 direct sentences, no fluff, do not reveal a model answer.".into(),
      pattern_success_feedback: "Access granted. Lock disengaged.".into(),
      pattern_default_error: "Access denied. The terminal rejects your input.".into(),
      grader_unavailable_feedback: "Could not reach the grading service. Your answer was recorded without credit.".into(),
      mentor_system: "You are CyberMentor, a calm cybersecurity instructor embedded in a training escape room. Answer the trainee concisely (2-4 sentences). Never reveal a lock's answer outright; nudge toward the relevant concept instead.".into(),
    }
  }
}

/// Attempt to load `MissionConfig` from MISSION_CONFIG_PATH. On any
/// parsing/IO error, returns None and the built-in defaults apply.
pub fn load_mission_config_from_env() -> Option<MissionConfig> {
  let path = std::env::var("MISSION_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<MissionConfig>(&s) {
      Ok(cfg) => {
        info!(target: "cybered_backend", %path, "Loaded mission config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "cybered_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "cybered_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Hard validation: a mission failing any of these checks is skipped at load.
pub fn mission_issues(m: &Mission) -> Vec<String> {
  let mut issues = Vec::new();
  if m.title.trim().is_empty() {
    issues.push("title is empty".into());
  }
  if m.questions.is_empty() {
    issues.push("mission has no questions".into());
  }
  for (i, q) in m.questions.iter().enumerate() {
    if q.id.trim().is_empty() {
      issues.push(format!("question #{i} has an empty id"));
    }
    if m.questions.iter().filter(|o| o.id == q.id).count() > 1 {
      issues.push(format!("duplicate question id '{}'", q.id));
    }
    if let QuestionKind::MultipleChoice { options } = &q.kind {
      if options.len() < 2 {
        issues.push(format!("question '{}' needs at least 2 options", q.id));
      }
      if !options.iter().any(|o| o.is_correct) {
        issues.push(format!("question '{}' has no correct option", q.id));
      }
      for opt in options {
        if options.iter().filter(|o| o.id == opt.id).count() > 1 {
          issues.push(format!("question '{}' has duplicate option id '{}'", q.id, opt.id));
        }
      }
    }
  }
  issues.sort();
  issues.dedup();
  issues
}

/// Soft validation: logged as warnings, the mission is still served.
pub fn mission_warnings(m: &Mission) -> Vec<String> {
  let mut warnings = Vec::new();
  for q in &m.questions {
    if let Some(options) = q.options() {
      let correct = options.iter().filter(|o| o.is_correct).count();
      if correct > 1 {
        // The first flagged option is canonical; the rest still pass.
        warnings.push(format!(
          "question '{}' flags {} options correct; the first one is canonical",
          q.id, correct
        ));
      }
    }
    if let Some(check) = q.validation() {
      if let PatternOutcome::Invalid(e) = check_pattern(&check.pattern, "") {
        warnings.push(format!(
          "question '{}' has a pattern that does not compile: {}",
          q.id, e
        ));
      }
    }
  }
  warnings
}
