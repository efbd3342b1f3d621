use config::ConfigError;

use crate::error::ConfigError as SettingsError;

/// Used only when no secret is configured outside production
const DEVELOPMENT_SECRET: &str = "reguides-development-only-secret-never-in-production";
const MIN_SECRET_LENGTH: usize = 32;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub admin: Option<AdminBootstrapSettings>,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    #[default]
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64, // seconds
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64, // seconds
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_access_expiry() -> i64 {
    15 * 60
}

fn default_refresh_expiry() -> i64 {
    7 * 24 * 60 * 60
}

fn default_issuer() -> String {
    "reguides".to_string()
}

impl JwtSettings {
    /// Resolve the signing secret for `environment`
    ///
    /// Production refuses to run without a configured secret; development
    /// and test fall back to a fixed, publicly known one.
    pub fn signing_secret(&self, environment: Environment) -> Result<String, SettingsError> {
        match self.secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => {
                if secret.trim() != secret {
                    return Err(SettingsError::InvalidValue(
                        "jwt.secret must not have leading or trailing whitespace".to_string(),
                    ));
                }
                if secret.len() < MIN_SECRET_LENGTH {
                    return Err(SettingsError::InvalidValue(format!(
                        "jwt.secret must be at least {} bytes",
                        MIN_SECRET_LENGTH
                    )));
                }
                Ok(secret.to_string())
            }
            _ if environment.is_production() => Err(SettingsError::MissingRequired(
                "jwt.secret (set APP__JWT__SECRET)".to_string(),
            )),
            _ => {
                tracing::warn!(
                    environment = ?environment,
                    "No JWT secret configured, using the insecure development secret"
                );
                Ok(DEVELOPMENT_SECRET.to_string())
            }
        }
    }

    /// Both lifetimes positive and the access token strictly shorter-lived
    pub fn validate_lifetimes(&self) -> Result<(), SettingsError> {
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(SettingsError::InvalidValue(
                "jwt token expiries must be positive".to_string(),
            ));
        }
        if self.access_token_expiry >= self.refresh_token_expiry {
            return Err(SettingsError::InvalidValue(
                "jwt.access_token_expiry must be shorter than jwt.refresh_token_expiry".to_string(),
            ));
        }
        Ok(())
    }
}

/// Paths guarded by the request gate
#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GateSettings {
    pub protected_prefix: String,
    pub login_path: String,
    pub app_path: String,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            protected_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
            app_path: "/admin".to_string(),
        }
    }
}

/// Birthday notification job
#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct SchedulerSettings {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Offset of the site's calendar day from UTC
    pub utc_offset_hours: i32,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_seconds: 60 * 60,
            utc_offset_hours: 0,
        }
    }
}

/// Initial admin account created on an empty database
#[derive(serde::Deserialize, Clone)]
pub struct AdminBootstrapSettings {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Load settings from `configuration.{yaml,toml,json}` (optional) and
/// `APP__SECTION__KEY` environment variables
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    settings.try_deserialize::<Settings>()
}
