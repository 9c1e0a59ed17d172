use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Runtime settings. Every field can be overridden with a
/// `STOCKTRADING_`-prefixed environment variable, e.g. `STOCKTRADING_BIND_ADDR`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Fallback filter when `RUST_LOG` is not set.
    pub log_level: String,

    // Staff account created at startup when both are present
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder(Environment::with_prefix("STOCKTRADING"))?
            .build()?
            .try_deserialize()
    }

    fn builder(
        env: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("database_url", "sqlite:stocktrading.db")?
            .set_default("bind_addr", "0.0.0.0:3000")?
            .set_default("log_level", "info")?
            .add_source(env))
    }

    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_username, &self.admin_password) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user.as_str(), password.as_str()))
            }
            _ => None,
        }
    }
}
