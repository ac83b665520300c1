//! Thin adapter over the Ollama HTTP API: single-shot completions with the
//! tool catalog, a bounded health probe, and NDJSON token streaming.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{GenerationConfig, OllamaConfig};
use crate::error::AssistantError;
use crate::traits::{ChatBackend, ChatOutcome, ToolCall};

/// Health probe deadline; anything slower counts as unavailable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for a non-streamed completion. Streamed requests only bound the
/// connect phase, since token generation can legitimately run long.
const CHAT_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OllamaGateway {
    client: Client,
    base_url: String,
    chat_model: String,
    stream_model: String,
}

/// The model server speaks plain HTTP on localhost; anything remote must be
/// behind TLS.
fn validate_base_url(base_url: &str) -> Result<(), String> {
    let parsed = reqwest::Url::parse(base_url)
        .map_err(|e| format!("Invalid base_url '{}': {}", base_url, e))?;

    let scheme = parsed.scheme();
    let host = parsed.host_str().unwrap_or("");

    match scheme {
        "https" => Ok(()),
        "http" => {
            let is_localhost =
                host == "localhost" || host == "127.0.0.1" || host == "[::1]" || host == "::1";
            if is_localhost {
                Ok(())
            } else {
                Err(format!(
                    "HTTP is only permitted for a localhost model server (base_url: '{}'). \
                     Use HTTPS for remote servers.",
                    base_url
                ))
            }
        }
        _ => Err(format!(
            "Unsupported URL scheme '{}' in base_url '{}'. Only http and https are allowed.",
            scheme, base_url
        )),
    }
}

impl OllamaGateway {
    pub fn new(config: &OllamaConfig) -> Result<Self, String> {
        validate_base_url(&config.base_url)?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            stream_model: config.stream_model.clone(),
        })
    }

    /// GET /api/version under the probe deadline. Any non-2xx, timeout, or
    /// unreadable body counts as unavailable.
    pub async fn probe(&self) -> Result<(), AssistantError> {
        let url = format!("{}/api/version", self.base_url);
        let resp = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| AssistantError::BackendUnavailable {
                message: e.to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(AssistantError::BackendUnavailable {
                message: format!("health probe returned {}", resp.status()),
            });
        }

        let version: Value =
            resp.json()
                .await
                .map_err(|e| AssistantError::BackendUnavailable {
                    message: format!("health probe body unreadable: {}", e),
                })?;
        debug!(version = %version, "Model server healthy");
        Ok(())
    }
}

#[async_trait]
impl ChatBackend for OllamaGateway {
    async fn chat_once(
        &self,
        system_prompt: &str,
        user_message: &str,
        tools: &[Value],
    ) -> anyhow::Result<ChatOutcome> {
        let body = json!({
            "model": self.chat_model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "stream": false,
            "tools": tools,
        });

        let url = format!("{}/api/chat", self.base_url);
        info!(model = %self.chat_model, url = %url, tools = tools.len(), "Calling model server");

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(CHAT_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(status = %status, "Model server error: {}", truncate(&text, 300));
            anyhow::bail!("model server returned {}: {}", status, truncate(&text, 300));
        }

        parse_chat_response(&text)
    }

    async fn chat_stream(
        &self,
        system_prompt: &str,
        user_message: &str,
        options: &GenerationConfig,
        tokens: &mpsc::Sender<String>,
    ) -> anyhow::Result<usize> {
        self.probe().await?;

        let body = json!({
            "model": self.stream_model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "stream": true,
            "options": options,
        });

        let url = format!("{}/api/chat", self.base_url);
        info!(model = %self.stream_model, url = %url, "Opening model stream");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status = %status, "Model stream refused: {}", truncate(&text, 300));
            anyhow::bail!("model server returned {}: {}", status, truncate(&text, 300));
        }

        let mut stream = resp.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();
        let mut forwarded = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let Some(part) = parse_stream_chunk(line.trim()) else {
                    continue;
                };
                if let Some(content) = part.content {
                    forwarded += 1;
                    if tokens.send(content).await.is_err() {
                        debug!("Token receiver dropped; abandoning stream");
                        return Ok(forwarded);
                    }
                }
                if part.done {
                    return Ok(forwarded);
                }
            }
        }

        Ok(forwarded)
    }
}

/// Parse a non-streamed /api/chat response into text + first tool call.
fn parse_chat_response(text: &str) -> anyhow::Result<ChatOutcome> {
    let data: Value = serde_json::from_str(text)?;
    let message = &data["message"];
    if message.is_null() {
        anyhow::bail!("no message in response");
    }

    let content = message["content"].as_str().unwrap_or_default().to_string();

    let tool_call = message["tool_calls"]
        .as_array()
        .and_then(|calls| calls.first())
        .map(|tc| ToolCall {
            name: tc["function"]["name"].as_str().unwrap_or_default().to_string(),
            arguments: tc["function"]["arguments"].clone(),
        });

    Ok(ChatOutcome {
        text: content,
        tool_call,
    })
}

struct StreamChunk {
    content: Option<String>,
    done: bool,
}

/// One NDJSON line from a streamed response. Malformed lines are skipped
/// rather than killing the stream.
fn parse_stream_chunk(line: &str) -> Option<StreamChunk> {
    if line.is_empty() {
        return None;
    }
    let part: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(err) => {
            warn!(error = %err, "Skipping malformed stream chunk");
            return None;
        }
    };
    let content = part["message"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    Some(StreamChunk {
        content,
        done: part["done"].as_bool() == Some(true),
    })
}

/// Truncate a body for logging, respecting UTF-8 char boundaries.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
