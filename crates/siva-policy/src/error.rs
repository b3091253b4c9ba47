// error.rs — Error types for the governance subsystem.
//
// Rule evaluation and the autonomy gate are total functions and never
// return errors. These variants only cover the seams around them:
// reading configuration, parsing names, and sharing the gate across threads.

use thiserror::Error;

/// Errors that can occur while configuring or sharing the governance gates.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The governance config file is not valid TOML.
    #[error("invalid TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The governance config file is not valid YAML.
    #[error("invalid YAML config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Another thread panicked while holding the shared governance lock.
    #[error("governance lock poisoned")]
    LockPoisoned,

    /// An action category name did not match any known category.
    #[error("unknown action category '{0}'")]
    UnknownAction(String),
}
