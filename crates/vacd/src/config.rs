//! Environment-driven daemon configuration.

use std::collections::HashSet;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use vac_model::AuthBackendKind;
use vac_observe::{LoggerConfig, LoggerFormat, LoggerLevel};

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_DB_PATH: &str = "vacation.db";
const DEFAULT_PAM_SERVICE: &str = "login";

#[derive(Debug)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    /// `None` means no `VACD_SECRET` was set; the daemon generates one and
    /// warns, since sessions then die with the process.
    pub secret: Option<String>,
    pub auth_backend: AuthBackendKind,
    pub admin_users: HashSet<String>,
    pub pam_service: String,
    pub registration_token: Option<String>,
    pub public_url: String,
    pub logger: LoggerConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from a variable lookup, so tests need not touch the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_raw = var("VACD_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("VACD_BIND is not a socket address: {bind_raw}"))?;

        let auth_backend = match var("VACD_AUTH_BACKEND") {
            Some(raw) => raw
                .parse::<AuthBackendKind>()
                .with_context(|| format!("VACD_AUTH_BACKEND: {raw}"))?,
            None => AuthBackendKind::default(),
        };

        let admin_users: HashSet<String> = var("VACD_ADMIN_USERS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut logger = LoggerConfig::default();
        if let Some(raw) = var("VACD_LOG_FORMAT") {
            logger.format = raw
                .parse::<LoggerFormat>()
                .with_context(|| format!("VACD_LOG_FORMAT: {raw}"))?;
        }
        if let Some(raw) = var("VACD_LOG_LEVEL") {
            logger.level = LoggerLevel::new(&raw)
                .with_context(|| format!("VACD_LOG_LEVEL: {raw}"))?;
        }

        let public_url = var("VACD_PUBLIC_URL").unwrap_or_else(|| format!("http://{bind}"));

        Ok(Self {
            db_path: var("VACD_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            bind,
            secret: var("VACD_SECRET").filter(|s| !s.is_empty()),
            auth_backend,
            admin_users,
            pam_service: var("VACD_PAM_SERVICE")
                .unwrap_or_else(|| DEFAULT_PAM_SERVICE.to_string()),
            registration_token: var("VACD_REGISTRATION_TOKEN").filter(|s| !s.is_empty()),
            public_url,
            logger,
        })
    }
}
