//! Process configuration parsed from flags and environment variables.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use backend::domain::{BoardServiceConfig, QuestionDestroyDenial, SearchSyncConfig};
use clap::Parser;
use tracing::warn;

/// `qa-board` command arguments. Every flag falls back to an environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "qa-board", about = "Question-and-answer board HTTP server", version)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "BOARD_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,
    /// File holding the session cookie signing key material.
    #[arg(long, env = "SESSION_KEY_FILE", default_value = "/var/run/secrets/session_key")]
    pub session_key_file: PathBuf,
    /// Generate a throwaway session key when the key file is unreadable.
    #[arg(long, env = "SESSION_ALLOW_EPHEMERAL", default_value_t = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[arg(
        long,
        env = "SESSION_COOKIE_SECURE",
        default_value_t = true,
        action = clap::ArgAction::Set,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub session_cookie_secure: bool,
    /// How a non-author question delete is answered: `reject` or `ignore`.
    #[arg(long, env = "QUESTION_DESTROY_DENIAL", default_value = "reject")]
    pub question_destroy_denial: QuestionDestroyDenial,
    /// Questions written to the search index at once.
    #[arg(long, env = "SEARCH_SYNC_MAX_CONCURRENT_WRITES", default_value_t = 4)]
    pub search_sync_max_concurrent_writes: usize,
    /// Attempts per index job, including the first.
    #[arg(long, env = "SEARCH_SYNC_MAX_ATTEMPTS", default_value_t = 5)]
    pub search_sync_max_attempts: u32,
    /// Delay before the first index retry, in milliseconds.
    #[arg(long, env = "SEARCH_SYNC_INITIAL_BACKOFF_MS", default_value_t = 100)]
    pub search_sync_initial_backoff_ms: u64,
    /// Upper bound on index retry delay, in milliseconds.
    #[arg(long, env = "SEARCH_SYNC_MAX_BACKOFF_MS", default_value_t = 5_000)]
    pub search_sync_max_backoff_ms: u64,
    /// Deadline for one index write or search query, in milliseconds.
    #[arg(long, env = "SEARCH_SYNC_ATTEMPT_TIMEOUT_MS", default_value_t = 2_000)]
    pub search_sync_attempt_timeout_ms: u64,
}

impl AppConfig {
    /// Load the session key, falling back to an ephemeral key in debug builds
    /// or when explicitly allowed.
    pub fn session_key(&self) -> io::Result<Key> {
        match std::fs::read(&self.session_key_file) {
            Ok(bytes) => Ok(Key::derive_from(&bytes)),
            Err(error) if cfg!(debug_assertions) || self.session_allow_ephemeral => {
                warn!(
                    path = %self.session_key_file.display(),
                    %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            }
            Err(error) => Err(io::Error::other(format!(
                "failed to read session key at {}: {error}",
                self.session_key_file.display()
            ))),
        }
    }

    /// Settings for the HTTP server.
    pub fn server_config(&self) -> io::Result<ServerConfig> {
        Ok(ServerConfig::new(
            self.session_key()?,
            self.session_cookie_secure,
            SameSite::Lax,
            self.bind_addr,
        ))
    }

    /// Settings for the search index synchronizer.
    pub fn search_sync_config(&self) -> SearchSyncConfig {
        SearchSyncConfig {
            max_concurrent_writes: self.search_sync_max_concurrent_writes.max(1),
            max_attempts: self.search_sync_max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.search_sync_initial_backoff_ms),
            max_backoff: Duration::from_millis(self.search_sync_max_backoff_ms),
            attempt_timeout: Duration::from_millis(self.search_sync_attempt_timeout_ms),
        }
    }

    /// Settings for the board service.
    pub fn board_service_config(&self) -> BoardServiceConfig {
        BoardServiceConfig {
            question_destroy_denial: self.question_destroy_denial,
            search_timeout: Duration::from_millis(self.search_sync_attempt_timeout_ms),
        }
    }
}

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
        }
    }
}
