// src/config.rs

use std::env;
use std::str::FromStr;

use dotenvy::dotenv;

/// Questions numbered up to this are closed-form unless the submission says otherwise.
pub const DEFAULT_CLOSED_QUESTIONS: u32 = 30;

/// Entries kept per user in the recent index.
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

/// Upper bound on answers in one submission.
pub const MAX_ANSWERS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub rust_log: String,
    pub log_dir: String,
    pub recent_capacity: usize,
    pub default_closed_questions: u32,
    pub index_write_retries: u32,
    pub admin_token: Option<String>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            rust_log: "info".to_string(),
            log_dir: "logs".to_string(),
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            default_closed_questions: DEFAULT_CLOSED_QUESTIONS,
            index_write_retries: 0,
            admin_token: None,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let database_url = non_empty_var("DATABASE_URL");

        let bind_addr = non_empty_var("BIND_ADDR").unwrap_or(defaults.bind_addr);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_dir = non_empty_var("LOG_DIR").unwrap_or(defaults.log_dir);

        // Capacity 0 would make every index empty.
        let recent_capacity =
            parse_var("RECENT_CAPACITY", defaults.recent_capacity).max(1);

        let default_closed_questions =
            parse_var("DEFAULT_CLOSED_QUESTIONS", defaults.default_closed_questions);

        let index_write_retries = parse_var("INDEX_WRITE_RETRIES", defaults.index_write_retries);

        let admin_token = non_empty_var("ADMIN_TOKEN");

        let cors_origins = non_empty_var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url,
            bind_addr,
            rust_log,
            log_dir,
            recent_capacity,
            default_closed_questions,
            index_write_retries,
            admin_token,
            cors_origins,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// Tracing is not initialised yet when config loads, hence eprintln.
fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match non_empty_var(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            eprintln!("{} has invalid value '{}', using {}", name, raw, default);
            default
        }),
        None => default,
    }
}
