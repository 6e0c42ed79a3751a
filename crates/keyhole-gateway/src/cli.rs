use clap::{Parser, ValueEnum};
use jiff::SignedDuration;
use keyhole_shortener::MappingPolicy;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "KEYHOLE_LISTEN_ADDR";
pub const BASE_URL_ENV: &str = "SHORT_URL_BASE";
pub const MAX_URL_LENGTH_ENV: &str = "MAX_LONG_URL_LENGTH";
pub const RETENTION_ENV: &str = "URL_RETENTION_DURATION";
pub const SWEEP_INTERVAL_ENV: &str = "KEYHOLE_SWEEP_INTERVAL";
pub const STORAGE_BACKEND_ENV: &str = "KEYHOLE_STORAGE_BACKEND";
pub const DB_PATH_ENV: &str = "DB_PATH";
pub const ID_LENGTH_ENV: &str = "KEYHOLE_ID_LENGTH";
pub const SECRET_LENGTH_ENV: &str = "KEYHOLE_SECRET_LENGTH";
pub const LOG_FORMAT_ENV: &str = "KEYHOLE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_BASE_URL: &str = "http://short.url";
pub const DEFAULT_DB_PATH: &str = "./short_url_db";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redb")]
    Redb,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redb => write!(f, "redb"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "keyhole", about = "Credential-gated URL shortener")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Public prefix of generated short URLs, e.g. `https://go.example.com`.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL, value_parser = parse_base_url)]
    pub base_url: String,

    /// Longest accepted target URL, in bytes.
    #[arg(
        long,
        env = MAX_URL_LENGTH_ENV,
        default_value_t = 100_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_url_length: u64,

    /// Maximum record age in seconds. 0 keeps records forever.
    #[arg(long, env = RETENTION_ENV, default_value_t = 604_800)]
    pub retention_secs: u64,

    #[arg(
        long,
        env = SWEEP_INTERVAL_ENV,
        default_value_t = 3_600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sweep_interval_secs: u64,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Redb
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(
        long,
        env = ID_LENGTH_ENV,
        default_value_t = 8,
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub id_length: u8,

    #[arg(
        long,
        env = SECRET_LENGTH_ENV,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(1..=64)
    )]
    pub secret_length: u8,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// The mapping rules described by these options.
    pub fn policy(&self) -> MappingPolicy {
        MappingPolicy::builder()
            .id_length(self.id_length as usize)
            .secret_length(self.secret_length as usize)
            .max_url_length(self.max_url_length as usize)
            .retention(self.retention())
            .build()
    }

    pub fn retention(&self) -> Option<SignedDuration> {
        match self.retention_secs {
            0 => None,
            secs => Some(SignedDuration::from_secs(secs.min(i64::MAX as u64) as i64)),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Accepts `scheme://host[/path]` and strips trailing slashes.
fn parse_base_url(value: &str) -> Result<String, String> {
    let trimmed = value.trim().trim_end_matches('/');
    match trimmed.split_once("://") {
        Some((scheme, host)) if !scheme.is_empty() && !host.is_empty() => Ok(trimmed.to_owned()),
        _ => Err(format!(
            "base url must look like scheme://host, got '{value}'"
        )),
    }
}
