//! Domain models used by the backend: missions, learning modules, questions
//! with their per-kind payloads, and the mentor chat transcript.

use serde::{Deserialize, Serialize};

/// Difficulty tag shown in the mission catalog.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}
impl Default for Difficulty {
  fn default() -> Self { Difficulty::Beginner }
}
impl Difficulty {
  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Beginner => "beginner",
      Difficulty::Intermediate => "intermediate",
      Difficulty::Advanced => "advanced",
    }
  }
}

/// Where did we get the mission from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MissionSource {
  ConfigBank,  // from user-provided TOML bank
  Seed,        // built-in missions (always available)
}

/// Render-only block inside a learning module.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentBlock {
  Text { body: String },
  Code { body: String },
  Tip { body: String },
  Image { url: String, #[serde(default)] caption: String },
}

/// External reading linked from a learning module.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reference {
  pub title: String,
  pub url: String,
}

/// Study material presented before the challenge phase of a mission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LearningModule {
  pub id: String,
  pub title: String,
  #[serde(default)] pub summary: String,
  #[serde(default)] pub icon: String,
  #[serde(default)] pub content: Vec<ContentBlock>,
  #[serde(default)] pub references: Vec<Reference>,
}

/// One selectable option of a multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChoiceOption {
  pub id: String,
  pub text: String,
  pub is_correct: bool,
  #[serde(default)] pub explanation: String,
}

/// Pattern check attached to an open-ended question. The pattern may start
/// with an inline flag marker such as `(?i)`; see `validator`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternCheck {
  pub pattern: String,
  #[serde(default)] pub error_message: Option<String>,
}

/// Per-kind question payload. Each variant carries only the fields that
/// matter for its kind, so call sites never probe optional fields blindly.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
  MultipleChoice {
    options: Vec<ChoiceOption>,
  },
  OpenEnded {
    #[serde(default)] validation: Option<PatternCheck>,
    #[serde(default)] grading_criteria: Option<String>,
  },
  /// Behaves like OpenEnded; kept distinct so the frontend can render a
  /// code editor instead of a plain input.
  CodeFix {
    #[serde(default)] validation: Option<PatternCheck>,
    #[serde(default)] grading_criteria: Option<String>,
  },
}

impl QuestionKind {
  /// Wire/display tag for the kind.
  pub fn tag(&self) -> &'static str {
    match self {
      QuestionKind::MultipleChoice { .. } => "multiple_choice",
      QuestionKind::OpenEnded { .. } => "open_ended",
      QuestionKind::CodeFix { .. } => "code_fix",
    }
  }
}

/// A single challenge ("terminal lock") within a mission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub prompt: String,
  #[serde(default)] pub context: Option<String>,
  #[serde(flatten)] pub kind: QuestionKind,
}

impl Question {
  /// Options of a multiple-choice question; None for typed-answer kinds.
  pub fn options(&self) -> Option<&[ChoiceOption]> {
    match &self.kind {
      QuestionKind::MultipleChoice { options } => Some(options),
      _ => None,
    }
  }

  /// First option flagged correct, if any. When authors flag several, the
  /// first one is the canonical answer for display purposes.
  pub fn correct_option(&self) -> Option<&ChoiceOption> {
    self.options().and_then(|opts| opts.iter().find(|o| o.is_correct))
  }

  /// Pattern check declared for this question, if any.
  pub fn validation(&self) -> Option<&PatternCheck> {
    match &self.kind {
      QuestionKind::OpenEnded { validation, .. } | QuestionKind::CodeFix { validation, .. } => {
        validation.as_ref()
      }
      QuestionKind::MultipleChoice { .. } => None,
    }
  }

  /// Free-text hint forwarded to the remote grader, if any.
  pub fn grading_criteria(&self) -> Option<&str> {
    match &self.kind {
      QuestionKind::OpenEnded { grading_criteria, .. }
      | QuestionKind::CodeFix { grading_criteria, .. } => grading_criteria.as_deref(),
      QuestionKind::MultipleChoice { .. } => None,
    }
  }
}

/// A themed unit of study: ordered learning modules plus ordered questions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mission {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: Difficulty,
  #[serde(default)] pub duration_minutes: u32,
  pub source: MissionSource,
  #[serde(default)] pub modules: Vec<LearningModule>,
  pub questions: Vec<Question>,
}

impl Mission {
  /// Question lookup by id.
  pub fn question(&self, qid: &str) -> Option<&Question> {
    self.questions.iter().find(|q| q.id == qid)
  }

  /// Position of a question id within the ordered list.
  pub fn question_index(&self, qid: &str) -> Option<usize> {
    self.questions.iter().position(|q| q.id == qid)
  }
}

/// Speaker of one mentor-chat turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
  User,
  Mentor,
}

/// One prior exchange in the mentor chat transcript, as kept by the client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
  pub role: ChatRole,
  pub text: String,
}
