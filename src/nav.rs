//! Navigator state: which mission is open, which question is on screen, and
//! whether the learner is reading modules or working the terminals.
//!
//! Switching missions always re-enters at the first question and the study
//! material, whatever progress is stored for the target mission. Progress is
//! visible through answered/locked styling, not through a resumed position.

use serde::Serialize;

use crate::domain::Mission;
use crate::progress::{MissionPhase, MissionState};

/// Which tab of the mission view is active.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionTab {
  Learn,
  Challenge,
}

/// Position within the currently selected mission.
#[derive(Clone, Debug, Serialize)]
pub struct Navigator {
  pub mission_id: String,
  pub index: usize,
  pub tab: MissionTab,
}

impl Navigator {
  pub fn new(mission_id: &str) -> Self {
    Self { mission_id: mission_id.to_string(), index: 0, tab: MissionTab::Learn }
  }

  /// Switch to another mission: index 0, study material first.
  pub fn select_mission(&mut self, mission_id: &str) {
    self.mission_id = mission_id.to_string();
    self.index = 0;
    self.tab = MissionTab::Learn;
  }

  /// Enter the challenge phase of the current mission.
  pub fn open_challenges(&mut self) {
    self.tab = MissionTab::Challenge;
  }

  /// True iff the question at `index` is answered and the mission is not
  /// locked by a failed choice.
  pub fn can_advance(&self, mission: &Mission, state: &MissionState, index: usize) -> bool {
    if state.phase == MissionPhase::Failed {
      return false;
    }
    mission
      .questions
      .get(index)
      .map(|q| state.is_answered(&q.id))
      .unwrap_or(false)
  }

  /// Move to the next question if the current one allows it; otherwise stay
  /// put. No wraparound, no skipping. Returns the (possibly unchanged) index.
  pub fn advance(&mut self, mission: &Mission, state: &MissionState) -> usize {
    if self.can_advance(mission, state, self.index) && self.index + 1 < mission.questions.len() {
      self.index += 1;
    }
    self.index
  }

  /// Back to the first question and the learning material. Used after a
  /// mission reset: the learner re-studies before retrying.
  pub fn reset(&mut self) {
    self.index = 0;
    self.tab = MissionTab::Learn;
  }
}
