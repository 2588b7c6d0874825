//! Groq-backed SQL agent.
//!
//! Talks to Groq's OpenAI-compatible chat-completions API with a fixed
//! small instruction-tuned model and a bounded tool-calling loop. The
//! tools expose the live database handle: list tables, describe one
//! table, run a query. Failed queries are folded back into the
//! conversation as tool output so the model can correct itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AgentEvent, ProgressSink, SqlAgent};
use crate::db::DatabaseHandle;
use crate::error::{ChatError, Result};

/// Groq chat-completions endpoint (OpenAI-compatible).
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// The fixed model used for SQL planning.
pub const GROQ_MODEL: &str = "llama3-8b-8192";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Maximum number of retry attempts for transient errors.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Maximum tool-calling rounds before a turn is abandoned.
const MAX_TOOL_ROUNDS: usize = 8;

/// SQL agent backed by the Groq API.
pub struct GroqAgent {
    client: Client,
    api_key: String,
    model: String,
    db: Arc<dyn DatabaseHandle>,
}

impl GroqAgent {
    /// Creates an agent bound to one database handle.
    pub fn new(api_key: impl Into<String>, db: Arc<dyn DatabaseHandle>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChatError::agent(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: GROQ_MODEL.to_string(),
            db,
        })
    }

    /// Overrides the model name.
    #[allow(dead_code)]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// System prompt describing the agent's job and tools.
    fn system_prompt() -> &'static str {
        "You are a SQL analyst answering questions about a database. \
         Work step by step: discover tables with list_tables, inspect the \
         relevant ones with table_schema, then answer with one or more \
         run_query calls. Only read data; never modify it. When you have \
         the answer, reply in plain language for a non-technical user."
    }

    /// JSON-schema tool definitions advertised to the model.
    fn tool_definitions() -> serde_json::Value {
        serde_json::json!([
            {
                "type": "function",
                "function": {
                    "name": "list_tables",
                    "description": "List the tables available in the database.",
                    "parameters": { "type": "object", "properties": {}, "required": [] }
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "table_schema",
                    "description": "Describe the columns of one table.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "table": { "type": "string", "description": "Table name" }
                        },
                        "required": ["table"]
                    }
                }
            },
            {
                "type": "function",
                "function": {
                    "name": "run_query",
                    "description": "Execute a read-only SQL query and return the rows.",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "sql": { "type": "string", "description": "The SQL to execute" }
                        },
                        "required": ["sql"]
                    }
                }
            }
        ])
    }

    /// Executes one tool call against the database.
    ///
    /// Errors are folded into the returned text rather than propagated;
    /// the model sees them as observations and may recover on its own.
    async fn dispatch_tool(
        &self,
        name: &str,
        arguments: &str,
        progress: &dyn ProgressSink,
    ) -> String {
        let args: serde_json::Value = match serde_json::from_str(arguments) {
            Ok(v) => v,
            Err(e) => return format!("error: malformed tool arguments: {e}"),
        };

        match name {
            "list_tables" => match self.db.list_tables().await {
                Ok(tables) if tables.is_empty() => "(no tables)".to_string(),
                Ok(tables) => tables.join(", "),
                Err(e) => format!("error: {e}"),
            },
            "table_schema" => {
                let Some(table) = args.get("table").and_then(|v| v.as_str()) else {
                    return "error: missing 'table' argument".to_string();
                };
                match self.db.table_schema(table).await {
                    Ok(schema) => schema,
                    Err(e) => format!("error: {e}"),
                }
            }
            "run_query" => {
                let Some(sql) = args.get("sql").and_then(|v| v.as_str()) else {
                    return "error: missing 'sql' argument".to_string();
                };
                progress.emit(AgentEvent::Sql(sql.to_string()));
                match self.db.run_query(sql).await {
                    Ok(result) => result.render_text(),
                    Err(e) => format!("Query failed: {e}"),
                }
            }
            other => format!("error: unknown tool '{other}'"),
        }
    }

    /// Sends one chat-completions request, retrying transient failures.
    async fn request(&self, messages: &[ApiMessage]) -> Result<ApiMessage> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            tools: Self::tool_definitions(),
            tool_choice: "auto".to_string(),
        };

        let mut last_error = None;
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Groq API request attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = self
                .client
                .post(GROQ_API_URL)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .map_err(|e| ChatError::agent(format!("Failed to read response: {e}")))?;

                    if status.is_success() {
                        let response: ChatResponse = serde_json::from_str(&body)
                            .map_err(|e| ChatError::agent(format!("Failed to parse response: {e}")))?;

                        return response
                            .choices
                            .into_iter()
                            .next()
                            .map(|c| c.message)
                            .ok_or_else(|| ChatError::agent("No response from Groq"));
                    }

                    let (error, is_retryable) = Self::parse_error(status, &body);
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!(
                        "Groq API request failed (attempt {}), retrying in {:?}: {}",
                        attempt, delay, status
                    );
                }
                Err(e) => {
                    let is_retryable = e.is_timeout() || e.is_connect();
                    let error = if e.is_timeout() {
                        ChatError::agent("Request timed out. Try again.")
                    } else if e.is_connect() {
                        ChatError::agent("Failed to connect to the Groq API. Check your network.")
                    } else {
                        ChatError::agent(format!("Request failed: {e}"))
                    };
                    last_error = Some(error);

                    if !is_retryable || attempt >= MAX_RETRY_ATTEMPTS {
                        break;
                    }

                    warn!("Groq API request failed (attempt {}), retrying in {:?}", attempt, delay);
                }
            }

            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        Err(last_error.unwrap_or_else(|| ChatError::agent("Request failed")))
    }

    /// Parses an API error response and returns (error, is_retryable).
    fn parse_error(status: reqwest::StatusCode, body: &str) -> (ChatError, bool) {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return (
                ChatError::agent("Authentication failed. Check your Groq API key."),
                false,
            );
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (
                ChatError::agent("Rate limited. Please wait and try again."),
                true,
            );
        }

        let is_retryable = status.is_server_error();

        if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(body) {
            return (
                ChatError::agent(format!("Groq API error: {}", error_response.error.message)),
                is_retryable,
            );
        }

        (
            ChatError::agent(format!("Groq API error ({status}): {body}")),
            is_retryable,
        )
    }
}

#[async_trait]
impl SqlAgent for GroqAgent {
    async fn run(&self, utterance: &str, progress: &dyn ProgressSink) -> Result<String> {
        let mut messages = vec![
            ApiMessage::system(Self::system_prompt()),
            ApiMessage::user(utterance),
        ];

        for _round in 0..MAX_TOOL_ROUNDS {
            let reply = self.request(&messages).await?;

            let tool_calls = reply.tool_calls.clone().unwrap_or_default();
            if tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                if answer.trim().is_empty() {
                    return Err(ChatError::agent("Model returned an empty answer"));
                }
                return Ok(answer);
            }

            messages.push(reply);
            for call in tool_calls {
                progress.emit(AgentEvent::ToolCall {
                    name: call.function.name.clone(),
                    input: call.function.arguments.clone(),
                });

                let content = self
                    .dispatch_tool(&call.function.name, &call.function.arguments, progress)
                    .await;

                progress.emit(AgentEvent::Observation(content.clone()));
                messages.push(ApiMessage::tool(call.id, content));
            }
        }

        Err(ChatError::agent(format!(
            "Gave up after {MAX_TOOL_ROUNDS} tool rounds without a final answer"
        )))
    }
}

// Groq API types (OpenAI-compatible)

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    tools: serde_json::Value,
    tool_choice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ApiMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn tool(tool_call_id: String, content: String) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content),
            tool_calls: None,
            tool_call_id: Some(tool_call_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: ApiFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
