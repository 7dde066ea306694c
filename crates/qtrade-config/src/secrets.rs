//! Secret resolution: config stores only environment-variable **names**
//! (e.g. `"BROKER_API_KEY_PAPER"`); callers resolve them once at startup via
//! [`resolve_secrets_for_mode`] and pass the result into constructors rather
//! than scattering `std::env::var` calls through the codebase.
//!
//! `Debug` redacts every field — these values must never land in a log line.

use serde_json::Value;

use crate::consumption::ConfigMode;
use crate::error::ConfigError;

#[derive(Clone)]
pub struct ResolvedSecrets {
    pub broker_api_key: Option<String>,
    pub broker_api_secret: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field(
                "broker_api_key",
                &self.broker_api_key.as_ref().map(|_| "<REDACTED>"),
            )
            .field(
                "broker_api_secret",
                &self.broker_api_secret.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

struct SecretEnvNames {
    broker_api_key_var: String,
    broker_api_secret_var: String,
}

fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

fn parse_env_names(config_json: &Value) -> SecretEnvNames {
    SecretEnvNames {
        broker_api_key_var: read_str_at(config_json, "/broker/keys_env/api_key")
            .unwrap_or_else(|| "QTRADE_BROKER_API_KEY".to_string()),
        broker_api_secret_var: read_str_at(config_json, "/broker/keys_env/api_secret")
            .unwrap_or_else(|| "QTRADE_BROKER_API_SECRET".to_string()),
    }
}

/// Resolves broker credentials from the environment for `mode`.
///
/// | Mode     | Required                          |
/// |----------|------------------------------------|
/// | Live     | broker api_key, broker api_secret |
/// | Paper    | broker api_key, broker api_secret |
/// | Backtest | nothing (no broker contacted)     |
///
/// Errors name the missing env var, never a resolved value.
pub fn resolve_secrets_for_mode(
    config_json: &Value,
    mode: ConfigMode,
) -> Result<ResolvedSecrets, ConfigError> {
    let names = parse_env_names(config_json);
    let broker_api_key = resolve_env(&names.broker_api_key_var);
    let broker_api_secret = resolve_env(&names.broker_api_secret_var);

    let mode_name = match mode {
        ConfigMode::Live => "live",
        ConfigMode::Paper => "paper",
        ConfigMode::Backtest => "backtest",
    };

    if matches!(mode, ConfigMode::Live | ConfigMode::Paper) {
        if broker_api_key.is_none() {
            return Err(ConfigError::MissingSecret {
                mode: mode_name.to_string(),
                env_var: names.broker_api_key_var,
            });
        }
        if broker_api_secret.is_none() {
            return Err(ConfigError::MissingSecret {
                mode: mode_name.to_string(),
                env_var: names.broker_api_secret_var,
            });
        }
    }

    Ok(ResolvedSecrets {
        broker_api_key,
        broker_api_secret,
    })
}
