pub mod error;
pub mod manifest;

pub use error::*;
pub use manifest::{Declaration, Manifest, ProviderSettings};

use std::path::{Path, PathBuf};

pub const MANIFEST_ENV: &str = "TCFLOW_MANIFEST";
pub const PROJECT_DIR: &str = ".tcflow";

const CANDIDATES: [&str; 2] = ["tcflow.local.yaml", "tcflow.yaml"];

/// tcflow's directory under the user config dir, created on demand
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("tcflow");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Locate the project manifest
///
/// Search order:
/// 1. `TCFLOW_MANIFEST` (explicit path)
/// 2. current directory: tcflow.local.yaml, tcflow.yaml
/// 3. `./.tcflow/`, same order
/// 4. `~/.config/tcflow/tcflow.yaml` (global manifest)
pub fn find_manifest() -> Result<PathBuf> {
    if let Ok(manifest_path) = std::env::var(MANIFEST_ENV) {
        let path = PathBuf::from(manifest_path);
        if path.exists() {
            return Ok(path);
        }
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("tcflow").join("tcflow.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::ManifestNotFound)
}

/// Directory that owns the state file for a manifest
///
/// A manifest inside `.tcflow/` belongs to the directory above it.
pub fn project_root(manifest: &Path) -> PathBuf {
    let dir = manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    if dir.file_name().is_some_and(|name| name == PROJECT_DIR) {
        return match dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
    }
    dir.to_path_buf()
}
