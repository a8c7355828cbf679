//! Declarative manifest (`tcflow.yaml`)
//!
//! ```yaml
//! provider:
//!   region: ap-guangzhou
//!   write_timeout_secs: 600
//!
//! resources:
//!   - type: tencentcloud_kms_key
//!     name: app
//!     config:
//!       alias: app-secrets
//!
//! data:
//!   - type: tencentcloud_kms_keys
//!     name: billing
//!     config:
//!       search_key_alias: billing
//! ```

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tcflow_cloud::{Attributes, ResourceConfig, ResourceSet, Timeouts};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub resources: Vec<Declaration>,

    /// Data source queries
    #[serde(default)]
    pub data: Vec<Declaration>,
}

/// Provider block; anything unset falls back to the environment or defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    pub region: Option<String>,
    pub read_timeout_secs: Option<u64>,
    pub write_timeout_secs: Option<u64>,
}

impl ProviderSettings {
    pub fn timeouts(&self) -> Timeouts {
        let defaults = Timeouts::default();
        Timeouts {
            read: self
                .read_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.read),
            write: self
                .write_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.write),
        }
    }
}

/// One declared resource or data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Declaration {
    #[serde(rename = "type")]
    pub resource_type: String,

    pub name: String,

    #[serde(default)]
    pub config: Attributes,
}

impl Declaration {
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }
}

impl Manifest {
    /// Read and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Manifest = serde_yaml::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content).map_err(|source| {
            ConfigError::Parse {
                path: "<inline>".into(),
                source,
            }
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Names must be identifiers and addresses unique per block
    pub fn validate(&self) -> Result<()> {
        for (block, declarations) in [("resources", &self.resources), ("data", &self.data)] {
            let mut seen = HashSet::new();
            for declaration in declarations {
                if declaration.resource_type.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{}: entry `{}` has an empty type",
                        block, declaration.name
                    )));
                }
                if !is_identifier(&declaration.name) {
                    return Err(ConfigError::Invalid(format!(
                        "{}: invalid name `{}` (letters, digits, `_` and `-` only)",
                        block, declaration.name
                    )));
                }
                if !seen.insert(declaration.address()) {
                    return Err(ConfigError::Invalid(format!(
                        "{}: duplicate declaration `{}`",
                        block,
                        declaration.address()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn resource_set(&self) -> ResourceSet {
        to_set(&self.resources)
    }

    pub fn data_set(&self) -> ResourceSet {
        to_set(&self.data)
    }
}

fn to_set(declarations: &[Declaration]) -> ResourceSet {
    let mut set = ResourceSet::new();
    for d in declarations {
        set.add(ResourceConfig::new(
            d.resource_type.clone(),
            d.name.clone(),
            d.config.clone(),
        ));
    }
    set
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
