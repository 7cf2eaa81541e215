//! CyberEd · Escape-Room Trainer Backend
//!
//! Mission progression engine for a browser-based cybersecurity escape room:
//! learners study short modules, then work through "terminal locks"
//! (multiple-choice and typed-answer questions). Pattern-checked locks are
//! decided locally; free-text locks go to an OpenAI-compatible grader, with a
//! zero-credit degrade when it is unreachable. A wrong choice fails the run
//! until the mission is reset.
//!
//! Exposed as a library so integration tests can build the router and state
//! in-process; `main.rs` is a thin entrypoint.

pub mod config;
pub mod domain;
pub mod error;
pub mod logic;
pub mod nav;
pub mod openai;
pub mod progress;
pub mod protocol;
pub mod routes;
pub mod seeds;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod validator;

pub use routes::build_router;
pub use state::AppState;
