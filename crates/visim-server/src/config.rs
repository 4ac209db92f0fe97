use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;
use crate::reference::DEFAULT_REFERENCE_DIRS;

/// Server configuration loaded from environment variables.
///
/// LLM client settings (`OPENAI_*`) are read separately by
/// `OpenAiClientConfig::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,
    /// Directories searched, in order, for reference templates.
    pub reference_dirs: Vec<PathBuf>,
}

impl Config {
    /// Optional:
    /// - `VISIM_BIND_ADDR` (default: "127.0.0.1:3000")
    /// - `VISIM_REFERENCE_DIRS`: `:`-separated list (default: references,
    ///   public/references, app/references relative to the working directory)
    pub fn from_env() -> Result<Self, AppError> {
        let bind_raw =
            std::env::var("VISIM_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
        let bind_addr = bind_raw.trim().parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("VISIM_BIND_ADDR is not a socket address ({bind_raw}): {e}"))
        })?;

        let reference_dirs = match std::env::var("VISIM_REFERENCE_DIRS") {
            Ok(raw) => parse_reference_dirs(&raw),
            Err(_) => default_reference_dirs(),
        };

        Ok(Self {
            bind_addr,
            reference_dirs,
        })
    }
}

pub fn default_reference_dirs() -> Vec<PathBuf> {
    DEFAULT_REFERENCE_DIRS.iter().map(PathBuf::from).collect()
}

/// Split a `:`-separated directory list, dropping empty entries. An empty
/// list means embedded templates only.
pub fn parse_reference_dirs(raw: &str) -> Vec<PathBuf> {
    raw.split(':')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}
