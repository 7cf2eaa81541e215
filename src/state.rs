//! Application state: mission bank, per-mission progress, navigator, prompts,
//! and the optional grading client.
//!
//! This module owns:
//!   - the mission bank (config missions first, then built-in seeds)
//!   - per-mission progress records (answers, feedback, score, phase)
//!   - the shared navigator (selected mission, question index, tab)
//!   - the in-flight grading set (one pending grade per question)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI-compatible grading client

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::{load_mission_config_from_env, mission_issues, mission_warnings, Prompts};
use crate::domain::Mission;
use crate::nav::Navigator;
use crate::openai::OpenAI;
use crate::progress::MissionState;
use crate::seeds::seed_missions;

#[derive(Clone)]
pub struct AppState {
    /// Immutable mission bank, in presentation order.
    pub missions: Arc<Vec<Mission>>,
    /// Mission id -> index into `missions`.
    pub mission_index: Arc<HashMap<String, usize>>,
    /// Mission id -> progress record. Created lazily on first touch.
    pub progress: Arc<RwLock<HashMap<String, MissionState>>>,
    /// Shared navigator: which mission/question/tab the UI is on.
    pub nav: Arc<RwLock<Navigator>>,
    /// (mission id, question id) pairs with a grade request in flight.
    pub grading_inflight: Arc<RwLock<HashSet<(String, String)>>>,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, merge seeds, validate, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = load_mission_config_from_env().unwrap_or_default();
        let openai = OpenAI::from_env();
        Self::new(cfg, openai)
    }

    pub fn new(cfg: crate::config::MissionConfig, openai: Option<OpenAI>) -> Self {
        let mut missions: Vec<Mission> = Vec::new();
        for m in cfg.missions {
            missions.push(m.into_mission());
        }
        let config_count = missions.len();
        // Seeds fill in behind the config bank; a config mission with the
        // same id wins.
        for s in seed_missions() {
            if missions.iter().any(|m| m.id == s.id) {
                info!(target: "cybered_backend", mission = %s.id, "config mission overrides the built-in seed");
            } else {
                missions.push(s);
            }
        }

        // Drop anything structurally broken; log the reasons and keep going.
        missions.retain(|m| {
            let issues = mission_issues(m);
            if issues.is_empty() {
                for w in mission_warnings(m) {
                    warn!(target: "cybered_backend", mission = %m.id, warning = %w, "mission warning");
                }
                true
            } else {
                warn!(target: "cybered_backend", mission = %m.id, issues = ?issues, "dropping invalid mission");
                false
            }
        });

        let mut mission_index = HashMap::new();
        for (i, m) in missions.iter().enumerate() {
            if mission_index.contains_key(&m.id) {
                warn!(target: "cybered_backend", mission = %m.id, "duplicate mission id in config; keeping the first");
            } else {
                mission_index.insert(m.id.clone(), i);
            }
        }

        let nav = match missions.first() {
            Some(m) => Navigator::new(&m.id),
            None => Navigator::new(""),
        };

        for m in &missions {
            info!(
                target: "cybered_backend",
                mission = %m.id,
                difficulty = m.difficulty.as_str(),
                source = ?m.source,
                questions = m.questions.len(),
                "mission loaded"
            );
        }

        info!(
            target: "cybered_backend",
            total = missions.len(),
            from_config = config_count,
            openai = openai.is_some(),
            "mission bank ready"
        );

        Self {
            missions: Arc::new(missions),
            mission_index: Arc::new(mission_index),
            progress: Arc::new(RwLock::new(HashMap::new())),
            nav: Arc::new(RwLock::new(nav)),
            grading_inflight: Arc::new(RwLock::new(HashSet::new())),
            openai,
            prompts: cfg.prompts,
        }
    }

    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.mission_index.get(id).map(|&i| &self.missions[i])
    }

    /// Clone of the progress record for `mission_id`, a fresh one if untouched.
    pub async fn progress_snapshot(&self, mission_id: &str) -> MissionState {
        let guard = self.progress.read().await;
        match guard.get(mission_id) {
            Some(s) => s.clone(),
            None => MissionState::new(mission_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissionConfig;

    fn state() -> AppState {
        AppState::new(MissionConfig::default(), None)
    }

    #[test]
    fn seed_bank_is_indexed() {
        let st = state();
        assert!(!st.missions.is_empty());
        let first = &st.missions[0];
        assert_eq!(st.mission_index.get(&first.id), Some(&0));
        assert!(st.mission(&first.id).is_some());
        assert!(st.mission("no-such-mission").is_none());
    }

    #[test]
    fn navigator_starts_on_first_mission() {
        let st = state();
        let nav = st.nav.try_read().ok().map(|n| n.mission_id.clone());
        assert_eq!(nav.as_deref(), Some(st.missions[0].id.as_str()));
    }

    #[tokio::test]
    async fn snapshot_of_untouched_mission_is_fresh() {
        let st = state();
        let id = st.missions[0].id.clone();
        let snap = st.progress_snapshot(&id).await;
        assert_eq!(snap.score, 0);
        assert!(snap.answers.is_empty());
    }

    #[test]
    fn config_mission_with_a_seed_id_wins() {
        let cfg: MissionConfig = toml::from_str(
            r#"
            [[missions]]
            id = "protocol-zero"
            title = "Custom Protocol Zero"

            [[missions.questions]]
            id = "c1"
            kind = "open_ended"
            prompt = "custom"
            "#,
        )
        .expect("parse");
        let st = AppState::new(cfg, None);
        let m = st.mission("protocol-zero").expect("present");
        assert_eq!(m.title, "Custom Protocol Zero");
        assert_eq!(st.missions.iter().filter(|m| m.id == "protocol-zero").count(), 1);
    }
}
