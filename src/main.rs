mod catalog;
mod config;
mod dispatch;
mod error;
mod gateway;
mod orchestrator;
mod prompt;
mod recovery;
mod retry;
mod server;
mod store;
mod traits;
mod types;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::gateway::OllamaGateway;
use crate::orchestrator::Assistant;
use crate::recovery::{NoopRecovery, OllamaRelauncher};
use crate::retry::RetryExecutor;
use crate::server::AppState;
use crate::store::HttpRequestStore;
use crate::traits::RecoveryHook;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-V" => {
                println!("bedside {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("bedside {}", env!("CARGO_PKG_VERSION"));
                println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
                println!("Usage: bedside [OPTIONS]\n");
                println!("Options:");
                println!("  -h, --help       Print help");
                println!("  -V, --version    Print version");
                println!("\nConfiguration is read from config.toml in the working directory;");
                println!("defaults target a local Ollama server at http://localhost:11434.");
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }

    let config = AppConfig::load(&PathBuf::from("config.toml"))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let gateway = OllamaGateway::new(&config.ollama).map_err(|e| anyhow::anyhow!(e))?;
    let store = HttpRequestStore::new(&config.store).map_err(|e| anyhow::anyhow!(e))?;

    let recovery: Arc<dyn RecoveryHook> = if config.retry.relaunch_on_connect_failure {
        Arc::new(OllamaRelauncher)
    } else {
        Arc::new(NoopRecovery)
    };
    let retry = RetryExecutor::new(config.retry.max_attempts, recovery);

    let assistant = Assistant::new(
        Arc::new(gateway),
        Arc::new(store),
        retry,
        config.ollama.generation.clone(),
    );

    server::serve(
        AppState {
            assistant: Arc::new(assistant),
        },
        &config.server.bind,
    )
    .await
}
