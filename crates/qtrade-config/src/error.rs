//! Config-loading error type. Variant messages embed the stable error-code
//! tokens ops tooling greps for (`CONFIG_SECRET_DETECTED`, `CONFIG_UNUSED_KEYS`,
//! `SECRETS_MISSING`, `SECRETS_UNKNOWN_MODE`) so they survive a round trip
//! through `Display` regardless of how a caller formats the error.

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    /// A config leaf looked like a literal secret rather than an
    /// environment-variable name.
    SecretDetected { pointer: String },
    /// Config carried keys no code path for `mode` reads.
    UnusedKeys { pointers: Vec<String> },
    /// A secret required in `mode` was absent or blank in the environment.
    MissingSecret { mode: String, env_var: String },
    UnknownMode(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io error: {err}"),
            Self::Yaml(err) => write!(f, "config yaml parse error: {err}"),
            Self::Json(err) => write!(f, "config json error: {err}"),
            Self::SecretDetected { pointer } => write!(
                f,
                "CONFIG_SECRET_DETECTED at {pointer}: value looks like a literal secret, not an environment variable name"
            ),
            Self::UnusedKeys { pointers } => write!(
                f,
                "CONFIG_UNUSED_KEYS: {} key(s) not read by any code path: {}",
                pointers.len(),
                pointers.join(", ")
            ),
            Self::MissingSecret { mode, env_var } => write!(
                f,
                "SECRETS_MISSING mode={mode}: required env var '{env_var}' is not set or empty"
            ),
            Self::UnknownMode(mode) => write!(
                f,
                "SECRETS_UNKNOWN_MODE: unrecognised mode '{mode}'; expected one of: live | paper | backtest"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
