//! Layered YAML configuration: load, deep-merge, canonicalize + hash, scan
//! for literal secrets, resolve the real secrets from the environment, flag
//! keys nothing reads, and deserialize the result into [`SessionConfig`].

mod consumption;
mod error;
mod loader;
mod secrets;
mod session;
mod unused_keys;

pub use consumption::{consumed_pointers, ConfigMode};
pub use error::ConfigError;
pub use loader::{load_layered_yaml, load_layered_yaml_from_strings, LoadedConfig};
pub use secrets::{resolve_secrets_for_mode, ResolvedSecrets};
pub use session::{
    AggregatorSection, BrokerSection, CheckpointSection, CoordinatorConfigSection,
    IdempotencySection, LifecycleSection, SessionConfig, SessionSection,
};
pub use unused_keys::{report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};
