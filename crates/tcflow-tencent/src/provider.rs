//! Tencent Cloud provider implementation

use crate::client::{STS, TencentApi, TencentClient};
use crate::config::TencentConfig;
use crate::data_sources::{KmsKeys, PrivateDnsZones};
use crate::error::TencentError;
use crate::resources::{CfsAccessGroup, KmsKey, PrivateDnsZone, TdmqNamespace};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tcflow_cloud::{AuthStatus, CloudProvider, DataSource, Resource};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCallerIdentityResponse {
    #[serde(default)]
    account_id: String,
    #[serde(default)]
    arn: String,
}

fn is_auth_failure(err: &TencentError) -> bool {
    err.code().is_some_and(|c| c.starts_with("AuthFailure"))
}

/// Tencent Cloud provider
///
/// Every resource shares the same API handle.
pub struct TencentCloudProvider {
    api: Arc<dyn TencentApi>,
    region: String,
}

impl TencentCloudProvider {
    pub fn new(config: TencentConfig) -> crate::Result<Self> {
        let region = config.region.clone();
        let client = TencentClient::new(config)?;
        Ok(Self {
            api: Arc::new(client),
            region,
        })
    }

    /// Build a provider over any API transport
    pub fn with_api(api: Arc<dyn TencentApi>, region: impl Into<String>) -> Self {
        Self {
            api,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl CloudProvider for TencentCloudProvider {
    fn name(&self) -> &str {
        "tencentcloud"
    }

    fn display_name(&self) -> &str {
        "Tencent Cloud"
    }

    async fn check_auth(&self) -> tcflow_cloud::Result<AuthStatus> {
        let request = STS.request("GetCallerIdentity", &serde_json::json!({}))?;
        match self.api.call(request).await {
            Ok(response) => {
                let identity: GetCallerIdentityResponse = serde_json::from_value(response)?;
                let account = if identity.arn.is_empty() {
                    identity.account_id
                } else {
                    format!("{} ({})", identity.account_id, identity.arn)
                };
                Ok(AuthStatus::ok(account))
            }
            Err(e) if is_auth_failure(&e) => Ok(AuthStatus::failed(e.to_string())),
            Err(TencentError::MissingEnvVar(var)) => {
                Ok(AuthStatus::failed(format!("{} is not set", var)))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resources(&self) -> Vec<Arc<dyn Resource>> {
        vec![
            Arc::new(KmsKey::new(self.api.clone())),
            Arc::new(PrivateDnsZone::new(self.api.clone())),
            Arc::new(TdmqNamespace::new(self.api.clone())),
            Arc::new(CfsAccessGroup::new(self.api.clone())),
        ]
    }

    fn data_sources(&self) -> Vec<Arc<dyn DataSource>> {
        vec![
            Arc::new(KmsKeys::new(self.api.clone())),
            Arc::new(PrivateDnsZones::new(self.api.clone())),
        ]
    }
}
