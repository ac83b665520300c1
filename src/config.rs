use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3400".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    /// Model for tool-calling turns.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Smaller model for interactive streaming.
    #[serde(default = "default_stream_model")]
    pub stream_model: String,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
            chat_model: default_chat_model(),
            stream_model: default_stream_model(),
            generation: GenerationConfig::default(),
        }
    }
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "mistral".to_string()
}

fn default_stream_model() -> String {
    "nemotron-mini".to_string()
}

/// Generation parameters passed through to the model server on streaming
/// calls. Pure configuration, no business logic attached.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
    #[serde(default = "default_repeat_penalty")]
    pub repeat_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            num_ctx: default_num_ctx(),
            repeat_penalty: default_repeat_penalty(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}
fn default_top_k() -> u32 {
    40
}
fn default_top_p() -> f32 {
    0.9
}
fn default_num_ctx() -> u32 {
    512
}
fn default_repeat_penalty() -> f32 {
    1.1
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Attempt to relaunch the local model server on connection failures.
    /// Turn off when something else supervises the server process.
    #[serde(default = "default_relaunch")]
    pub relaunch_on_connect_failure: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            relaunch_on_connect_failure: default_relaunch(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_relaunch() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_base_url")]
    pub base_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_base_url(),
        }
    }
}

fn default_store_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl AppConfig {
    /// Load from `path`; a missing file means defaults, a malformed one is
    /// an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
