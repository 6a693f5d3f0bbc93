use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a [`ControllerConfig`](crate::config::ControllerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read controller config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse controller config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Fatal errors of the controller core. Per-frame problems never end up here;
/// they are logged and the affected feature is skipped for that frame.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("required collaborator `{0}` was not provided")]
    MissingCollaborator(&'static str),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
