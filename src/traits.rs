use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::config::GenerationConfig;
use crate::types::AssistanceRequestRecord;

/// A single tool call as returned by the model. Arguments arrive as the raw
/// JSON object the model produced; they are validated at dispatch.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

/// One non-streamed completion: free text, plus at most one tool call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub text: String,
    pub tool_call: Option<ToolCall>,
}

/// Chat backend — sends messages + tool defs to the model server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat_once(
        &self,
        system_prompt: &str,
        user_message: &str,
        tools: &[Value],
    ) -> anyhow::Result<ChatOutcome>;

    /// Probe the backend, then stream content tokens into `tokens`.
    /// Returns the number of content chunks forwarded, so the caller can
    /// tell an empty stream from a crashed one.
    async fn chat_stream(
        &self,
        system_prompt: &str,
        user_message: &str,
        options: &GenerationConfig,
        tokens: &mpsc::Sender<String>,
    ) -> anyhow::Result<usize>;
}

/// Persistence contract for assistance requests. The store itself lives
/// outside this layer; only the create operation is needed here.
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create_assistance_request(
        &self,
        record: &AssistanceRequestRecord,
    ) -> anyhow::Result<()>;
}

/// Best-effort recovery action fired when the model server looks down.
/// Implementations must never fail loudly; the retry loop does not wait on
/// them or observe their outcome.
#[async_trait]
pub trait RecoveryHook: Send + Sync {
    async fn attempt_recovery(&self);
}
