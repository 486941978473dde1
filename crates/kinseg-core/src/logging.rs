//! Structured logging foundation.
//!
//! Dual-mode logging on stderr: human-readable console output for
//! interactive use, machine-parseable JSON lines for automation. stdout is
//! reserved for command payloads. Respects `KINSEG_LOG` and `RUST_LOG`.

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "structured" | "machine" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Logging configuration resolved from CLI flags and environment.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Level directive used when neither KINSEG_LOG nor RUST_LOG is set,
    /// e.g. "info" or "kinseg_core=debug".
    pub level: Option<String>,
    pub format: LogFormat,
}

/// Initialize the logging subsystem. Must be called once at startup before
/// any logging occurs.
pub fn init_logging(config: &LogConfig) {
    let default_level = config.level.as_deref().unwrap_or("info");
    let filter = std::env::var("KINSEG_LOG")
        .ok()
        .and_then(|v| v.parse::<EnvFilter>().ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(format!("kinseg_core={default_level}")));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(use_ansi)
                .init();
        }
        LogFormat::Jsonl => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
    }
}
