use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use serde::Deserialize;

use crate::session::IdleConfig;

#[derive(Parser, Debug)]
#[command(name = "fluxoazul", about = "FluxoAzul - financial management backend for small businesses")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "fluxoazul.toml")]
    pub config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Declarative seed file applied at startup (overrides config file)
    #[arg(short, long)]
    pub seed: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub support_chat: SupportChatConfig,

    #[serde(default)]
    pub finance: FinanceConfig,

    /// Optional TOML file with records to load at startup.
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// When true, all API endpoints (except /health and /metrics) require authentication.
    #[serde(default)]
    pub enabled: bool,

    /// Static API keys. Each key has a name (for audit) and a role.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiKeyEntry {
    pub name: String,
    pub key: String,
    #[serde(default = "default_role")]
    pub role: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    #[serde(default = "default_sqlite_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_session_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_session_warning")]
    pub warning_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupportChatConfig {
    #[serde(default = "default_chat_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default = "default_chat_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    #[serde(default = "default_working_days")]
    pub working_days: u32,
}

fn default_role() -> String {
    "reader".to_string()
}

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        json: false,
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_sqlite_path() -> String {
    "fluxoazul.db".to_string()
}

fn default_session_timeout() -> u64 {
    900
}

fn default_session_warning() -> u64 {
    60
}

fn default_chat_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_prompt() -> String {
    "Você é o assistente de suporte do FluxoAzul. Responda em português, de forma breve.".to_string()
}

fn default_chat_timeout() -> u64 {
    30
}

fn default_working_days() -> u32 {
    fluxoazul_core::calc::DEFAULT_WORKING_DAYS
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: StorageKind::Memory,
            path: default_sqlite_path(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            timeout_seconds: default_session_timeout(),
            warning_seconds: default_session_warning(),
        }
    }
}

impl SessionConfig {
    pub fn idle_config(&self) -> IdleConfig {
        IdleConfig::new(
            Duration::from_secs(self.timeout_seconds),
            Duration::from_secs(self.warning_seconds),
        )
    }
}

impl Default for SupportChatConfig {
    fn default() -> Self {
        SupportChatConfig {
            api_url: default_chat_url(),
            api_key: None,
            model: default_chat_model(),
            system_prompt: default_system_prompt(),
            max_tokens: None,
            timeout_seconds: default_chat_timeout(),
        }
    }
}

impl Default for FinanceConfig {
    fn default() -> Self {
        FinanceConfig {
            working_days: default_working_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: default_server(),
            logging: default_logging(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            session: SessionConfig::default(),
            support_chat: SupportChatConfig::default(),
            finance: FinanceConfig::default(),
            seed: None,
        }
    }
}

impl Config {
    pub fn load(cli: &CliArgs) -> Self {
        let mut config = match std::fs::read_to_string(&cli.config) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                eprintln!("Warning: Failed to parse config file: {}", e);
                Config::default()
            }),
            Err(_) => Config::default(),
        };

        // CLI overrides
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        if let Some(ref seed) = cli.seed {
            config.seed = Some(seed.clone());
        }

        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
