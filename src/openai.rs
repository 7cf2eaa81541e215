//! OpenAI-compatible client for the engine's two call-outs: grading free-text
//! lock answers and powering the mentor chat.
//!
//! Only chat.completions is used, requested either as plain text or as a
//! strict JSON object. Calls are instrumented and log model names, latencies,
//! and token usage (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{ChatRole, ChatTurn, Question};
use crate::util::fill_template;

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
}

/// Outcome of a remote grading call. Score is clamped to 0-100 at this
/// boundary; the state machine trusts it afterwards.
#[derive(Clone, Debug)]
pub struct Grade {
  pub score: u32,
  pub feedback: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    Self::new(api_key, base_url)
  }

  /// Construct with an explicit key and base URL. Model names and the
  /// request timeout still honor their env overrides.
  pub fn new(api_key: String, base_url: String) -> Option<Self> {
    let fast_model = std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model = std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());
    // Bounds learner-visible latency; expiry degrades like any grader failure.
    let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
      .ok()
      .and_then(|s| s.parse::<u64>().ok())
      .unwrap_or(20);

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model, strong_model })
  }

  /// POST one chat.completions request and pull the reply text out of the
  /// first choice. Both the plain and the JSON-object paths funnel through
  /// here.
  async fn send_chat(&self, req: &ChatCompletionRequest) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "cybered-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body
      .choices
      .get(0)
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();
    Ok(text)
  }

  /// Plain-text chat completion over an arbitrary message list.
  #[instrument(level = "info", skip(self, messages), fields(model = %model, messages = messages.len()))]
  async fn chat_messages(
    &self,
    model: &str,
    messages: Vec<ChatMessageReq>,
    temperature: f32,
  ) -> Result<String, String> {
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages,
      temperature,
      response_format: None,
      max_tokens: None,
    };
    let text = self.send_chat(&req).await?;
    Ok(text.trim().to_string())
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
      max_tokens: None,
    };
    let text = self.send_chat(&req).await?;
    serde_json::from_str::<T>(&text).map_err(|e| format!("JSON parse error: {}", e))
  }

  // --- High-level helpers (domain-specialized) ---

  /// Grade a free-text answer against the question's criteria.
  /// Transport, HTTP and parse failures all come back as Err; the caller
  /// maps them to the zero-credit degrade.
  #[instrument(
    level = "info",
    skip(self, prompts, question, answer),
    fields(question_id = %question.id, answer_len = answer.len(), model = %self.strong_model)
  )]
  pub async fn grade_answer(
    &self,
    prompts: &Prompts,
    question: &Question,
    answer: &str,
  ) -> Result<Grade, String> {
    #[derive(Deserialize)]
    struct Graded {
      score: f32,
      #[serde(default)]
      feedback: String,
    }

    let user = fill_template(
      &prompts.grading_user_template,
      &[
        ("prompt", question.prompt.as_str()),
        ("context", question.context.as_deref().unwrap_or("")),
        ("criteria", question.grading_criteria().unwrap_or("")),
        ("answer", answer),
      ],
    );

    let start = std::time::Instant::now();
    let result = self
      .chat_json::<Graded>(&self.strong_model, &prompts.grading_system, &user, 0.2)
      .await;
    let elapsed = start.elapsed();

    let g = match result {
      Ok(g) => g,
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during grading");
        return Err(e);
      }
    };

    let score = g.score.clamp(0.0, 100.0).round() as u32;
    info!(?elapsed, score, "Grading response received");
    Ok(Grade { score, feedback: g.feedback })
  }

  /// Mentor chat reply: persona + prior transcript + the new message.
  #[instrument(
    level = "info",
    skip(self, prompts, history, message),
    fields(history_len = history.len(), message_len = message.len(), model = %self.fast_model)
  )]
  pub async fn mentor_reply(
    &self,
    prompts: &Prompts,
    history: &[ChatTurn],
    message: &str,
  ) -> Result<String, String> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessageReq { role: "system".into(), content: prompts.mentor_system.clone() });
    for turn in history {
      let role = match turn.role {
        ChatRole::User => "user",
        ChatRole::Mentor => "assistant",
      };
      messages.push(ChatMessageReq { role: role.into(), content: turn.text.clone() });
    }
    messages.push(ChatMessageReq { role: "user".into(), content: message.into() });

    self.chat_messages(&self.fast_model, messages, 0.4).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Pull the human-readable message out of an OpenAI-style error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct ErrBody { error: ErrDetail }
  #[derive(Deserialize)]
  struct ErrDetail { message: String }
  serde_json::from_str::<ErrBody>(body).ok().map(|b| b.error.message)
}
