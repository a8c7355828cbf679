//! Resource and data source traits
//!
//! A [`Resource`] translates between declarative attributes and a remote API.
//! Implementations only marshal requests and responses; the contract around
//! them (validation, read-after-create, immutable fields, idempotent delete)
//! is enforced by [`crate::lifecycle::Lifecycle`].

use crate::error::Result;
use crate::id::ResourceId;
use crate::retry::Context;
use crate::schema::{Attributes, Diff, Schema};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// A managed remote entity with declarative desired state
#[async_trait]
pub trait Resource: Send + Sync {
    /// Resource type name (e.g. "tencentcloud_kms_key")
    fn type_name(&self) -> &'static str;

    /// Field table of this resource type
    fn schema(&self) -> &Schema;

    /// Number of `#`-separated segments in a persisted ID
    fn id_segments(&self) -> usize {
        1
    }

    /// Cross-field checks the schema cannot express
    ///
    /// Runs at plan time and before every create or update, after the schema
    /// has validated field types.
    fn validate(&self, _config: &Attributes) -> Result<()> {
        Ok(())
    }

    /// Create the remote entity from a validated configuration and return its ID
    async fn create(&self, ctx: &Context, config: &Attributes) -> Result<ResourceId>;

    /// Fetch the remote entity; `None` when it no longer exists
    async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>>;

    /// Apply in-place changes listed in `diff`
    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        config: &Attributes,
        diff: &Diff,
    ) -> Result<()>;

    /// Delete the remote entity
    async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()>;
}

/// Result of evaluating a data source
#[derive(Debug, Clone, PartialEq)]
pub struct DataResult {
    /// Stable ID derived from the returned items
    pub id: String,
    pub attributes: Attributes,
}

/// Read-only query against the remote API
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &Schema;

    async fn read(&self, ctx: &Context, args: &Attributes) -> Result<DataResult>;
}

/// Deterministic ID for a data source result set
pub fn ids_hash(ids: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ids.join("-").as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// Typed access to attribute values
pub trait AttributesExt {
    fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T>;

    fn get_str(&self, key: &str) -> Option<&str>;
}

impl AttributesExt for Attributes {
    fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }
}
