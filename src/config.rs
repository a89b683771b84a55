//! Command line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tui_dispatch_debug::DebugCliArgs;

use crate::api::{self, ApiError};

pub const SERVER_ENV: &str = "ADVENTURE_SERVER";
pub const DEFAULT_SERVER: &str = "http://localhost:5000";

/// Adventure - terminal client for the Dungeons & Adventures game server
#[derive(Parser, Debug)]
#[command(name = "adventure")]
#[command(about = "Play the Dungeons & Adventures RPG from the terminal")]
pub struct Args {
    /// Game server url (falls back to $ADVENTURE_SERVER, then localhost:5000)
    #[arg(long, short)]
    pub server: Option<String>,

    /// Request timeout in seconds (minimum 1)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Upside Down status refresh interval in seconds (minimum 1)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Where to write logs
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub debug: DebugCliArgs,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid game server: {0}")]
    Server(#[source] ApiError),
    #[error("log file path {0:?} is a directory")]
    LogPathIsDirectory(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub server: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub log_file: PathBuf,
}

impl RuntimeConfig {
    /// Precedence: flag, then environment, then the built-in default.
    pub fn resolve(
        server: Option<String>,
        env_server: Option<String>,
        timeout_secs: u64,
        poll_secs: u64,
        log_file: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let server = server
            .or(env_server)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        api::parse_base_url(&server).map_err(ConfigError::Server)?;

        let log_file = log_file.unwrap_or_else(default_log_file);
        if log_file.is_dir() {
            return Err(ConfigError::LogPathIsDirectory(log_file));
        }

        Ok(Self {
            server,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            poll_interval: Duration::from_secs(poll_secs.max(1)),
            log_file,
        })
    }
}

fn default_log_file() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|dir| dir.join("adventure-tui"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("adventure.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        let config = RuntimeConfig::resolve(
            Some("http://game.local:8080".into()),
            Some("http://env.local".into()),
            10,
            10,
            Some(PathBuf::from("adventure-test.log")),
        )
        .expect("valid config");
        assert_eq!(config.server, "http://game.local:8080");
    }

    #[test]
    fn environment_then_default() {
        let config = RuntimeConfig::resolve(
            None,
            Some("http://env.local".into()),
            10,
            10,
            Some(PathBuf::from("adventure-test.log")),
        )
        .expect("valid config");
        assert_eq!(config.server, "http://env.local");

        let config = RuntimeConfig::resolve(None, None, 3, 7, Some(PathBuf::from("a.log")))
            .expect("valid config");
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_secs(7));
    }

    #[test]
    fn rejects_non_http_server() {
        let result = RuntimeConfig::resolve(Some("ftp://x".into()), None, 10, 10, None);
        assert!(matches!(result, Err(ConfigError::Server(_))));
    }

    #[test]
    fn default_log_file_name() {
        assert!(default_log_file().ends_with("adventure.log"));
    }

    #[test]
    fn zero_timeout_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["adventure", "--timeout", "0"]).is_err());
        let args = Args::try_parse_from(["adventure", "--server", "http://h:1"]).expect("args");
        assert_eq!(args.server.as_deref(), Some("http://h:1"));
        assert_eq!(args.poll_interval, 10);
    }
}
