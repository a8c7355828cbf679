use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Manifest not found. Looked in:\n\
        - current directory: tcflow.local.yaml, tcflow.yaml\n\
        - ./.tcflow/ directory\n\
        - ~/.config/tcflow/tcflow.yaml\n\
        Set TCFLOW_MANIFEST or pass --file to use another path"
    )]
    ManifestNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
