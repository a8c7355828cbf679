//! Tencent Cloud provider for tcflow
//!
//! Implements the `CloudProvider` trait on top of a small Tencent Cloud API
//! 3.0 client. Requests are signed with TC3-HMAC-SHA256 and every call runs
//! inside the retry loop from `tcflow-cloud`.
//!
//! # Resources
//!
//! - `tencentcloud_kms_key`
//! - `tencentcloud_private_dns_zone`
//! - `tencentcloud_tdmq_namespace` (ID `environ_name#cluster_id`)
//! - `tencentcloud_cfs_access_group`
//!
//! # Data sources
//!
//! - `tencentcloud_kms_keys`
//! - `tencentcloud_private_dns_zones`
//!
//! # Requirements
//!
//! `TENCENTCLOUD_SECRET_ID` and `TENCENTCLOUD_SECRET_KEY` must be set;
//! `TENCENTCLOUD_SECURITY_TOKEN` and `TENCENTCLOUD_REGION` are optional.
//!
//! # Example
//!
//! ```ignore
//! use tcflow_tencent::{TencentCloudProvider, TencentConfig};
//! use tcflow_cloud::CloudProvider;
//!
//! let provider = TencentCloudProvider::new(TencentConfig::from_env()?)?;
//!
//! let auth = provider.check_auth().await?;
//! if !auth.authenticated {
//!     panic!("Not authenticated: {:?}", auth.error);
//! }
//! ```

pub mod client;
pub mod config;
pub mod data_sources;
pub mod error;
pub mod helper;
pub mod provider;
pub mod resources;
pub mod sign;

pub use client::{ApiRequest, Service, TencentApi, TencentClient};
pub use config::{Credential, TencentConfig};
pub use error::{Result, TencentError};
pub use provider::TencentCloudProvider;
