use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "chal.2025-us.ductf.net";
pub const DEFAULT_PORT: u16 = 30021;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_REMOTE_DELAY: Duration = Duration::from_secs(1);

const DEFAULT_GDB_SCRIPT: &str = "\
set context-sections stack regs disasm
set show-compact-regs on
set resolve-heap-via-heuristic on
set follow-fork-mode parent
continue
";

/// Everything needed to reach the target. Field names follow the JSON profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub binary: Option<PathBuf>,
    pub binary_args: Vec<String>,
    pub host: String,
    pub port: u16,
    pub timeout_secs: f64,
    pub remote_delay_secs: f64,
    pub gdb_script: String,
    pub gdb_port: u16,
    /// Command that opens a window for gdb; split shell-style.
    pub terminal: String,
    pub menu_prompt: String,
    pub value_prompt: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            binary: None,
            binary_args: vec!["--allow-natives-syntax".to_string()],
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            remote_delay_secs: DEFAULT_REMOTE_DELAY.as_secs_f64(),
            gdb_script: DEFAULT_GDB_SCRIPT.to_string(),
            gdb_port: 1234,
            terminal: "tmux splitw -h".to_string(),
            menu_prompt: String::new(),
            value_prompt: String::new(),
        }
    }
}

impl Profile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn remote_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.remote_delay_secs).unwrap_or(DEFAULT_REMOTE_DELAY)
    }

    pub fn remote_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
