//! Hands a configuration record to a new sender process.
//!
//! The record goes to a uniquely named JSON file; its path is the sender's only
//! argument. The child is neither awaited nor monitored, the sender reports
//! through its own console, exit code and failure log.

use common::model::config::SendConfig;
use log::info;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

/// Writes `config` into `dir` and returns the file path.
pub fn write_config(config: &SendConfig, dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join(format!(
        "whatsapp_automation_config_{}.json",
        Uuid::new_v4().simple()
    ));
    config.save(&path).map_err(|e| e.to_string())?;
    Ok(path)
}

/// Starts `sender` with `config_path` and returns the child's process id.
pub fn spawn_sender(sender: &Path, config_path: &Path) -> Result<u32, String> {
    if !sender.is_file() {
        return Err(format!(
            "Sender executable not found: {}. Set WA_SENDER_BIN or place it next to the form.",
            sender.display()
        ));
    }

    let mut command = Command::new(sender);
    command.arg(config_path);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
        command.creation_flags(CREATE_NEW_CONSOLE);
    }

    let child = command
        .spawn()
        .map_err(|e| format!("Failed to start sender: {}", e))?;
    info!(
        "started sender (pid {}) with {}",
        child.id(),
        config_path.display()
    );
    Ok(child.id())
}
