//! Test infrastructure: MockBackend, MemoryStore, and CountingRecovery.
//!
//! Provides a fully wired Assistant with a scripted model backend and an
//! in-memory record store, suitable for turn-level tests that exercise the
//! real orchestration path.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

use crate::config::GenerationConfig;
use crate::orchestrator::Assistant;
use crate::retry::RetryExecutor;
use crate::traits::{ChatBackend, ChatOutcome, RecoveryHook, RequestStore, ToolCall};
use crate::types::AssistanceRequestRecord;

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// A recorded call to `MockBackend::chat_once()`.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct MockChatCall {
    pub system_prompt: String,
    pub user_message: String,
    pub tool_count: usize,
}

/// One scripted reaction to a chat call.
pub enum ScriptedChat {
    Reply(ChatOutcome),
    Failure(String),
}

/// One scripted reaction to a stream call.
pub enum ScriptedStream {
    Tokens(Vec<&'static str>),
    Failure(String),
}

/// Mock chat backend that returns scripted responses in FIFO order. An empty
/// script answers every chat call with plain text.
pub struct MockBackend {
    chat_script: Mutex<Vec<ScriptedChat>>,
    stream_script: Mutex<Vec<ScriptedStream>>,
    pub chat_calls: Mutex<Vec<MockChatCall>>,
    stream_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            chat_script: Mutex::new(Vec::new()),
            stream_script: Mutex::new(Vec::new()),
            chat_calls: Mutex::new(Vec::new()),
            stream_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_chat_script(script: Vec<ScriptedChat>) -> Self {
        Self {
            chat_script: Mutex::new(script),
            ..Self::new()
        }
    }

    pub fn with_stream_script(script: Vec<ScriptedStream>) -> Self {
        Self {
            stream_script: Mutex::new(script),
            ..Self::new()
        }
    }

    /// Helper: a text-only reply.
    pub fn text_reply(text: &str) -> ScriptedChat {
        ScriptedChat::Reply(ChatOutcome {
            text: text.to_string(),
            tool_call: None,
        })
    }

    /// Helper: a reply selecting a tool call.
    pub fn tool_reply(name: &str, arguments: Value) -> ScriptedChat {
        ScriptedChat::Reply(ChatOutcome {
            text: String::new(),
            tool_call: Some(ToolCall {
                name: name.to_string(),
                arguments,
            }),
        })
    }

    /// Helper: a failed attempt with the given error message.
    pub fn failure(message: &str) -> ScriptedChat {
        ScriptedChat::Failure(message.to_string())
    }

    /// How many times `chat_once()` was called.
    pub async fn chat_call_count(&self) -> usize {
        self.chat_calls.lock().await.len()
    }

    pub fn stream_call_count(&self) -> usize {
        self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat_once(
        &self,
        system_prompt: &str,
        user_message: &str,
        tools: &[Value],
    ) -> anyhow::Result<ChatOutcome> {
        self.chat_calls.lock().await.push(MockChatCall {
            system_prompt: system_prompt.to_string(),
            user_message: user_message.to_string(),
            tool_count: tools.len(),
        });

        let mut script = self.chat_script.lock().await;
        if script.is_empty() {
            return Ok(ChatOutcome {
                text: "Mock response".to_string(),
                tool_call: None,
            });
        }
        match script.remove(0) {
            ScriptedChat::Reply(outcome) => Ok(outcome),
            ScriptedChat::Failure(message) => Err(anyhow!(message)),
        }
    }

    async fn chat_stream(
        &self,
        _system_prompt: &str,
        _user_message: &str,
        _options: &GenerationConfig,
        tokens: &mpsc::Sender<String>,
    ) -> anyhow::Result<usize> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);

        let mut script = self.stream_script.lock().await;
        if script.is_empty() {
            return Ok(0);
        }
        match script.remove(0) {
            ScriptedStream::Tokens(parts) => {
                let mut forwarded = 0;
                for part in parts {
                    forwarded += 1;
                    let _ = tokens.send(part.to_string()).await;
                }
                Ok(forwarded)
            }
            ScriptedStream::Failure(message) => Err(anyhow!(message)),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory record store. `failing()` makes every write error, for
/// exercising the persistence-failure paths.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<AssistanceRequestRecord>>,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub async fn records(&self) -> Vec<AssistanceRequestRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn create_assistance_request(
        &self,
        record: &AssistanceRequestRecord,
    ) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("record store unavailable");
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CountingRecovery
// ---------------------------------------------------------------------------

/// Recovery hook that only counts invocations.
#[derive(Default)]
pub struct CountingRecovery {
    calls: AtomicUsize,
}

impl CountingRecovery {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecoveryHook for CountingRecovery {
    async fn attempt_recovery(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct TestHarness {
    pub assistant: Assistant,
    pub backend: Arc<MockBackend>,
    pub store: Arc<MemoryStore>,
    pub recovery: Arc<CountingRecovery>,
}

/// Wire an Assistant around the given backend with a fresh in-memory store.
pub fn setup_test_assistant(backend: MockBackend) -> TestHarness {
    setup_test_assistant_with_store(backend, MemoryStore::default())
}

pub fn setup_test_assistant_with_store(backend: MockBackend, store: MemoryStore) -> TestHarness {
    let backend = Arc::new(backend);
    let store = Arc::new(store);
    let recovery = Arc::new(CountingRecovery::default());

    let assistant = Assistant::new(
        backend.clone(),
        store.clone(),
        RetryExecutor::new(3, recovery.clone()),
        GenerationConfig::default(),
    );

    TestHarness {
        assistant,
        backend,
        store,
        recovery,
    }
}
