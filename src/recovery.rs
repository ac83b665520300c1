//! Recovery hook implementations: relaunching the local model server when a
//! connection failure suggests it is not running.

use async_trait::async_trait;
use std::process::Stdio;
use tracing::{info, warn};

use crate::traits::RecoveryHook;

/// No-op hook for tests and for deployments where something else (launchd,
/// systemd, the Ollama desktop app) supervises the server process.
pub struct NoopRecovery;

#[async_trait]
impl RecoveryHook for NoopRecovery {
    async fn attempt_recovery(&self) {}
}

/// Best-effort relaunch of the local Ollama process. Spawns detached and
/// never reports failure upward; the retry loop's next attempt is the only
/// check that matters.
pub struct OllamaRelauncher;

#[async_trait]
impl RecoveryHook for OllamaRelauncher {
    async fn attempt_recovery(&self) {
        match relaunch() {
            Ok(()) => info!("Requested model server relaunch"),
            Err(err) => warn!(error = %err, "Model server relaunch failed"),
        }
    }
}

#[cfg(windows)]
fn relaunch() -> std::io::Result<()> {
    // `start` detaches, so the daemon never holds the server as a child.
    std::process::Command::new("cmd")
        .args(["/C", "start", "", r"C:\Program Files\Ollama\ollama.exe"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(not(windows))]
fn relaunch() -> std::io::Result<()> {
    std::process::Command::new("ollama")
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
