//! Run configuration loaded once from the environment.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "API_KEY";
pub const USER_NAME_VAR: &str = "GIT_USER_NAME";
pub const USER_EMAIL_VAR: &str = "GIT_USER_EMAIL";
pub const LANGUAGE_VAR: &str = "COMMIT_LANGUAGE";

/// Environment variable to override the Gemini API base URL.
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";

/// Environment variable to override the per-request timeout (seconds).
pub const TIMEOUT_VAR: &str = "AUTOCOMMIT_TIMEOUT";

pub const DEFAULT_LANGUAGE: &str = "pt-BR";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub(crate) const ENV_EXAMPLE_HINT: &str =
    "Copy .env.example to .env and fill in your values.";

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub user_name: String,
    pub user_email: String,
    pub language: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Config {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// Blank values count as missing. Fails with the names of every missing
    /// required variable, in declaration order.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank(API_KEY_VAR);
        let user_name = non_blank(USER_NAME_VAR);
        let user_email = non_blank(USER_EMAIL_VAR);

        let missing: Vec<&'static str> = [
            (API_KEY_VAR, api_key.is_none()),
            (USER_NAME_VAR, user_name.is_none()),
            (USER_EMAIL_VAR, user_email.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(api_key), Some(user_name), Some(user_email)) = (api_key, user_name, user_email)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let language = match lookup(LANGUAGE_VAR) {
            Some(v) if v.trim().is_empty() => return Err(ConfigError::BlankLanguage),
            Some(v) => v.trim().to_string(),
            None => DEFAULT_LANGUAGE.to_string(),
        };

        let api_base = non_blank(API_BASE_VAR)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            api_key,
            user_name,
            user_email,
            language,
            api_base,
            timeout: parse_timeout(lookup(TIMEOUT_VAR)),
        })
    }

    /// Replace the target language, rejecting a blank one.
    pub fn with_language(mut self, language: impl Into<String>) -> Result<Self, ConfigError> {
        self.language = language.into();
        self.validate()?;
        Ok(self)
    }

    /// Check the invariants a run relies on before anything touches the
    /// working tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::BlankLanguage);
        }
        Ok(())
    }
}

/// Parse the timeout override, logging a warning on invalid values.
fn parse_timeout(raw: Option<String>) -> Duration {
    match raw {
        Some(v) if !v.is_empty() => match v.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
