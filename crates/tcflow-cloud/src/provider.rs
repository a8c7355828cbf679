//! Cloud provider trait definition

use crate::error::Result;
use crate::resource::{DataSource, Resource};
use crate::schema::Attributes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Cloud provider abstraction trait
///
/// A provider bundles the resource and data source types of one cloud behind
/// a shared, already-configured API client.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "tencentcloud")
    fn name(&self) -> &str;

    /// Returns the provider display name for UI
    fn display_name(&self) -> &str;

    /// Check if the provider is properly configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Resource types managed by this provider
    fn resources(&self) -> Vec<Arc<dyn Resource>>;

    /// Data source types offered by this provider
    fn data_sources(&self) -> Vec<Arc<dyn DataSource>>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Set of declared resources (or data sources), keyed by address
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.address(), resource);
    }

    pub fn get(&self, address: &str) -> Option<&ResourceConfig> {
        self.resources.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.resources.contains_key(address)
    }

    /// Iterate in address order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Declared configuration of one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "tencentcloud_kms_key")
    pub resource_type: String,

    /// Local name, unique per type
    pub name: String,

    /// Resource-specific configuration
    pub config: Attributes,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        config: Attributes,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            config,
        }
    }

    /// Get the full resource address (type.name)
    pub fn address(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
