use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading configuration. Resolution itself never fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse config data in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("invalid config in {origin}: {message}")]
    Invalid { origin: String, message: String },
}

impl ConfigError {
    /// Short name of the failure class, stable for scripts.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::Invalid { .. } => "invalid",
        }
    }

    pub(crate) fn invalid(origin: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            origin: origin.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(origin: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.to_owned(),
            message: message.into(),
        }
    }
}
