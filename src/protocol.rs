//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Answer keys never cross the wire: options lose their correctness flags and
//! explanations, patterns and grading criteria stay server-side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ChatTurn, Difficulty, LearningModule, Mission, MissionSource, Question};
use crate::nav::{MissionTab, Navigator};
use crate::progress::{MissionPhase, MissionState};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListMissions,
    SelectMission {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    OpenChallenges {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    SubmitChoice {
        #[serde(rename = "missionId")]
        mission_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        #[serde(rename = "optionId")]
        option_id: String,
    },
    SubmitAnswer {
        #[serde(rename = "missionId")]
        mission_id: String,
        #[serde(rename = "questionId")]
        question_id: String,
        answer: String,
    },
    Advance {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    ResetMission {
        #[serde(rename = "missionId")]
        mission_id: String,
    },
    MentorMessage {
        #[serde(default)]
        history: Vec<ChatTurn>,
        text: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Missions {
        missions: Vec<MissionSummaryOut>,
    },
    MissionView {
        view: MissionViewOut,
    },
    ChoiceResult {
        result: ChoiceOut,
    },
    AnswerResult {
        result: AnswerOut,
    },
    Position {
        nav: NavOut,
    },
    MissionReset {
        result: ResetOut,
    },
    MentorReply {
        text: String,
    },
    Error {
        message: String,
    },
}

/// Option as shown to the learner.
#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub id: String,
    pub text: String,
}

/// Question as shown to the learner. `options` is empty for typed-answer
/// kinds.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: String,
    pub prompt: String,
    pub context: Option<String>,
    pub kind: &'static str,
    pub options: Vec<OptionOut>,
}

/// DTO used by both WS and HTTP for mission delivery.
#[derive(Debug, Serialize)]
pub struct MissionOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub source: MissionSource,
    pub modules: Vec<LearningModule>,
    pub questions: Vec<QuestionOut>,
}

/// Catalog row: mission header plus progress tallies for the sidebar.
#[derive(Debug, Serialize)]
pub struct MissionSummaryOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub source: MissionSource,
    pub questions: usize,
    pub answered: usize,
    pub score: u32,
    pub phase: MissionPhase,
}

#[derive(Debug, Serialize)]
pub struct MissionListOut {
    pub missions: Vec<MissionSummaryOut>,
}

/// Progress snapshot on the wire. The grading epoch is internal bookkeeping
/// and stays server-side.
#[derive(Debug, Serialize)]
pub struct MissionStateOut {
    pub mission_id: String,
    pub answers: HashMap<String, String>,
    pub feedback: HashMap<String, String>,
    pub score: u32,
    pub phase: MissionPhase,
}

#[derive(Debug, Serialize)]
pub struct NavOut {
    pub mission_id: String,
    pub index: usize,
    pub tab: MissionTab,
    pub can_advance: bool,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MissionViewOut {
    pub mission: MissionOut,
    pub state: MissionStateOut,
    pub nav: NavOut,
}

/// What happened to a typed submission.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// Recorded, with `score_delta` added (0 for the grading degrade).
    Accepted,
    /// Not recorded; the learner can edit and resubmit.
    Rejected,
    /// A grading call for this question is already in flight.
    Pending,
    /// The grading result arrived for a run that no longer exists.
    Discarded,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub mission_id: String,
    pub question_id: String,
    pub status: AnswerStatus,
    pub score_delta: u32,
    pub feedback: String,
    pub mission_completed: bool,
    pub state: MissionStateOut,
    pub nav: NavOut,
}

#[derive(Debug, Serialize)]
pub struct ChoiceOut {
    pub mission_id: String,
    pub question_id: String,
    pub correct: bool,
    pub explanation: String,
    pub mission_completed: bool,
    pub state: MissionStateOut,
    pub nav: NavOut,
}

#[derive(Debug, Serialize)]
pub struct ResetOut {
    pub mission_id: String,
    pub state: MissionStateOut,
    pub nav: NavOut,
}

/// Convert a full `Question` (internal) to the public DTO.
pub fn question_out(q: &Question) -> QuestionOut {
    let options = q
        .options()
        .map(|opts| {
            opts.iter()
                .map(|o| OptionOut { id: o.id.clone(), text: o.text.clone() })
                .collect()
        })
        .unwrap_or_default();
    QuestionOut {
        id: q.id.clone(),
        prompt: q.prompt.clone(),
        context: q.context.clone(),
        kind: q.kind.tag(),
        options,
    }
}

/// Convert a full `Mission` (internal) to the public DTO.
pub fn mission_out(m: &Mission) -> MissionOut {
    MissionOut {
        id: m.id.clone(),
        title: m.title.clone(),
        description: m.description.clone(),
        difficulty: m.difficulty,
        duration_minutes: m.duration_minutes,
        source: m.source,
        modules: m.modules.clone(),
        questions: m.questions.iter().map(question_out).collect(),
    }
}

pub fn state_out(s: &MissionState) -> MissionStateOut {
    MissionStateOut {
        mission_id: s.mission_id.clone(),
        answers: s.answers.clone(),
        feedback: s.feedback.clone(),
        score: s.score,
        phase: s.phase,
    }
}

/// Navigator view for one mission. When the shared navigator points at a
/// different mission, the view is the entry position for this one.
pub fn nav_out(nav: &Navigator, mission: &Mission, state: &MissionState) -> NavOut {
    let (index, tab) = if nav.mission_id == mission.id {
        (nav.index, nav.tab)
    } else {
        (0, MissionTab::Learn)
    };
    NavOut {
        mission_id: mission.id.clone(),
        index,
        tab,
        can_advance: nav.can_advance(mission, state, index),
        total: mission.questions.len(),
    }
}

pub fn summary_out(m: &Mission, s: &MissionState) -> MissionSummaryOut {
    MissionSummaryOut {
        id: m.id.clone(),
        title: m.title.clone(),
        description: m.description.clone(),
        difficulty: m.difficulty,
        duration_minutes: m.duration_minutes,
        source: m.source,
        questions: m.questions.len(),
        answered: m.questions.iter().filter(|q| s.is_answered(&q.id)).count(),
        score: s.score,
        phase: s.phase,
    }
}

pub fn mission_view_out(mission: &Mission, state: &MissionState, nav: &Navigator) -> MissionViewOut {
    MissionViewOut {
        mission: mission_out(mission),
        state: state_out(state),
        nav: nav_out(nav, mission, state),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct MissionQuery {
    #[serde(rename = "missionId")]
    pub mission_id: String,
}

#[derive(Deserialize)]
pub struct MissionIn {
    #[serde(rename = "missionId")]
    pub mission_id: String,
}

#[derive(Deserialize)]
pub struct ChoiceIn {
    #[serde(rename = "missionId")]
    pub mission_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "optionId")]
    pub option_id: String,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "missionId")]
    pub mission_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    pub answer: String,
}

#[derive(Deserialize)]
pub struct MentorIn {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    pub text: String,
}
#[derive(Serialize)]
pub struct MentorOut {
    pub text: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_missions;

    #[test]
    fn question_dto_hides_the_answer_key() {
        let missions = seed_missions();
        let mission = &missions[0];
        let out = mission_out(mission);

        let rendered = serde_json::to_string(&out).expect("serializes");
        assert!(!rendered.contains("is_correct"));
        assert!(!rendered.contains("isCorrect"));
        assert!(!rendered.contains("explanation"));
        assert!(!rendered.contains("pattern"));
        assert!(!rendered.contains("grading_criteria"));

        // Choice questions still expose their options for rendering.
        let q2 = out.questions.iter().find(|q| q.id == "q2").expect("q2 exists");
        assert_eq!(q2.kind, "multiple_choice");
        assert!(q2.options.len() >= 2);
    }

    #[test]
    fn client_messages_parse_from_camel_case_wire_form() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"submit_answer","missionId":"protocol-zero","questionId":"q5","answer":"443"}"#,
        )
        .expect("parses");
        match msg {
            ClientWsMessage::SubmitAnswer { mission_id, question_id, answer } => {
                assert_eq!(mission_id, "protocol-zero");
                assert_eq!(question_id, "q5");
                assert_eq!(answer, "443");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn server_messages_carry_the_snake_case_type_tag() {
        let rendered = serde_json::to_string(&ServerWsMessage::Pong).expect("serializes");
        assert_eq!(rendered, r#"{"type":"pong"}"#);

        let rendered = serde_json::to_string(&ServerWsMessage::MentorReply { text: "hi".into() })
            .expect("serializes");
        assert!(rendered.contains(r#""type":"mentor_reply""#));
    }
}
