//! Per-turn conversation state machine. Decides whether an incoming message
//! answers a pending confirmation, needs a model turn, or is a streaming
//! session, and converts every failure into conversational text. All turn
//! state is threaded through parameters; nothing here outlives a call.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::catalog;
use crate::config::GenerationConfig;
use crate::dispatch;
use crate::error::AssistantError;
use crate::prompt;
use crate::retry::RetryExecutor;
use crate::traits::{ChatBackend, RequestStore};
use crate::types::{AssistanceRequestRecord, ConversationContext, PendingRequest, TurnReply};

/// Frames every streamed token sequence, on success and failure alike.
pub const START_SENTINEL: &str = "[START]";
pub const END_SENTINEL: &str = "[END]";

pub struct Assistant {
    gateway: Arc<dyn ChatBackend>,
    store: Arc<dyn RequestStore>,
    retry: RetryExecutor,
    generation: GenerationConfig,
}

impl Assistant {
    pub fn new(
        gateway: Arc<dyn ChatBackend>,
        store: Arc<dyn RequestStore>,
        retry: RetryExecutor,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            retry,
            generation,
        }
    }

    /// Process one conversation turn. Never fails: every error degrades to
    /// an apology so the chat stays available.
    pub async fn process_message(
        &self,
        user_message: &str,
        context: &ConversationContext,
    ) -> TurnReply {
        if let Some(pending) = &context.pending_request {
            match confirmation_reply(user_message) {
                Some(true) => return self.submit_pending(pending).await,
                Some(false) => {
                    info!("Pending request declined");
                    return TurnReply::text(prompt::DECLINE_ACK);
                }
                // Neither token (or both): let the model sort it out.
                None => {}
            }
        }

        match self.model_turn(user_message, context).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(error = %err, "Turn failed");
                TurnReply::text(prompt::GENERIC_APOLOGY)
            }
        }
    }

    /// Stream a text-only reply, framed by the start/end sentinels. Tool
    /// calling and confirmation handling are deliberately absent here.
    ///
    /// A failed attempt emits a readable error token before its end
    /// sentinel, and exhaustion is still returned so the caller knows the
    /// session died even though something was already shown.
    pub async fn stream_message(
        &self,
        user_message: &str,
        tokens: mpsc::Sender<String>,
    ) -> Result<(), AssistantError> {
        let system_prompt = format!("{}{}", prompt::SYSTEM_PROMPT, prompt::STREAM_FOCUS);
        let system_prompt = system_prompt.as_str();

        self.retry
            .execute(|| {
                let tokens = tokens.clone();
                async move {
                    send_token(&tokens, START_SENTINEL).await;
                    match self
                        .gateway
                        .chat_stream(system_prompt, user_message, &self.generation, &tokens)
                        .await
                    {
                        Ok(forwarded) => {
                            if forwarded == 0 {
                                send_token(&tokens, prompt::EMPTY_STREAM_APOLOGY).await;
                            }
                            send_token(&tokens, END_SENTINEL).await;
                            Ok(())
                        }
                        Err(err) => {
                            warn!(error = %err, "Streaming attempt failed");
                            send_token(&tokens, prompt::STREAM_ERROR_TOKEN).await;
                            send_token(&tokens, END_SENTINEL).await;
                            Err(err)
                        }
                    }
                }
            })
            .await
    }

    async fn submit_pending(&self, pending: &PendingRequest) -> TurnReply {
        let record = AssistanceRequestRecord::from_pending(pending);
        match self.store.create_assistance_request(&record).await {
            Ok(()) => {
                info!(
                    priority = %record.priority,
                    department = %record.department,
                    "Confirmed request submitted"
                );
                TurnReply::text(prompt::submitted_summary(pending))
            }
            Err(err) => {
                error!(error = %err, "Failed to persist confirmed request");
                TurnReply::text(prompt::REQUEST_APOLOGY)
            }
        }
    }

    async fn model_turn(
        &self,
        user_message: &str,
        context: &ConversationContext,
    ) -> Result<TurnReply, AssistantError> {
        let system_prompt = prompt::context_prompt(context);

        let outcome = self
            .retry
            .execute(|| {
                self.gateway
                    .chat_once(&system_prompt, user_message, catalog::tool_definitions())
            })
            .await?;

        if let Some(call) = &outcome.tool_call {
            return match dispatch::dispatch(call, context, self.store.as_ref()).await {
                Ok(result) => Ok(TurnReply {
                    text: result.text,
                    pending_request: result.pending_request,
                }),
                Err(err) => {
                    warn!(error = %err, tool = %call.name, "Tool dispatch rejected");
                    Ok(TurnReply::text(prompt::UNPROCESSABLE_APOLOGY))
                }
            };
        }

        Ok(TurnReply::text(outcome.text))
    }
}

async fn send_token(tokens: &mpsc::Sender<String>, token: &str) {
    // The receiver may already be gone (client disconnect); that only means
    // nobody is listening, not that the turn failed.
    let _ = tokens.send(token.to_string()).await;
}

/// Decide whether a reply confirms or declines a pending request.
///
/// Exact-token match after normalization: the reply is lowercased and split
/// on non-alphanumerics, and only the standalone tokens "yes" and "no"
/// count. A reply containing both, or neither, is ambiguous and falls
/// through to a fresh model turn.
fn confirmation_reply(message: &str) -> Option<bool> {
    let lowered = message.to_lowercase();
    let mut has_yes = false;
    let mut has_no = false;
    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        match token {
            "yes" => has_yes = true,
            "no" => has_no = true,
            _ => {}
        }
    }
    match (has_yes, has_no) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}
