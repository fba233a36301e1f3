use std::{env, io::Write};

use chrono::Duration;
use log::*;
use ods_common::Secret;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::errors::ServerError;

const DEFAULT_ODS_HOST: &str = "127.0.0.1";
const DEFAULT_ODS_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/order_desk.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_JWT_EXPIRY: Duration = Duration::hours(24);
const GENERATED_SECRET_LENGTH: usize = 48;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub auth: AuthConfig,
    /// If set, this administrator account is created at start-up unless it already exists.
    pub bootstrap_admin: Option<AdminCredentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ODS_HOST.to_string(),
            port: DEFAULT_ODS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            bootstrap_admin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("ODS_HOST").ok().unwrap_or_else(|| DEFAULT_ODS_HOST.into());
        let port = parse_or_default("ODS_PORT", env::var("ODS_PORT").ok(), DEFAULT_ODS_PORT);
        let database_url = env::var("ODS_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ ODS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections =
            parse_or_default("ODS_MAX_CONNECTIONS", env::var("ODS_MAX_CONNECTIONS").ok(), DEFAULT_MAX_CONNECTIONS);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let bootstrap_admin = AdminCredentials::from_values(
            env::var("ODS_ADMIN_USERNAME").ok(),
            env::var("ODS_ADMIN_PASSWORD").ok(),
        );
        Self { host, port, database_url, max_connections, auth, bootstrap_admin }
    }
}

/// Parses an optional environment value, logging and falling back to `default` if it is missing or invalid.
fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match value {
        Some(s) => s.parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        None => default,
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared HS256 secret used to sign and verify access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an issued access token remains valid.
    pub token_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut tmpfile = NamedTempFile::new().ok().and_then(|f| f.keep().ok());
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every issued token becomes invalid when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_SECRET_LENGTH)
            .map(char::from)
            .collect::<String>();
        match &mut tmpfile {
            Some((f, p)) => {
                let key_data = json!({ "jwt_secret": secret }).to_string();
                match writeln!(f, "{key_data}") {
                    Ok(()) => warn!(
                        "🚨️🚨️🚨️ The JWT secret for this session was written to {}. If this is a production \
                         instance, you are doing it wrong! Set the ODS_JWT_SECRET environment variable instead. \
                         🚨️🚨️🚨️",
                        p.to_str().unwrap_or("???")
                    ),
                    Err(e) => warn!("🪛️ Could not write the JWT secret to the temporary file. {e}"),
                }
            },
            None => {
                warn!("🪛️ Could not create a temporary file to store the JWT secret.");
            },
        }
        Self { jwt_secret: Secret::new(secret), token_expiry: DEFAULT_JWT_EXPIRY }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_expiry: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_expiry }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("ODS_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [ODS_JWT_SECRET]")))?;
        let hours = env::var("ODS_JWT_EXPIRY_HOURS").ok();
        Self::from_values(secret, hours)
    }

    fn from_values(secret: String, expiry_hours: Option<String>) -> Result<Self, ServerError> {
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("ODS_JWT_SECRET is empty".to_string()));
        }
        let hours = parse_or_default("ODS_JWT_EXPIRY_HOURS", expiry_hours, DEFAULT_JWT_EXPIRY.num_hours());
        let token_expiry = if hours > 0 {
            Duration::hours(hours)
        } else {
            let default_hours = DEFAULT_JWT_EXPIRY.num_hours();
            warn!("🪛️ ODS_JWT_EXPIRY_HOURS must be positive. Using the default of {default_hours} hrs.");
            DEFAULT_JWT_EXPIRY
        };
        Ok(Self::new(secret, token_expiry))
    }
}

//-------------------------------------------------  AdminCredentials  -------------------------------------------------
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: Secret<String>,
}

impl AdminCredentials {
    fn from_values(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
                Some(Self { username, password: Secret::new(password) })
            },
            (Some(username), _) => {
                warn!("🪛️ ODS_ADMIN_USERNAME is {username}, but ODS_ADMIN_PASSWORD is not set. Skipping the bootstrap.");
                None
            },
            _ => None,
        }
    }
}
