//! `tencentcloud_private_dns_zone`: PrivateDNS zone bound to VPCs

use crate::client::{PRIVATE_DNS, TencentApi};
use crate::helper::{call, call_optional, call_unit, request, to_attributes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, CloudError, Context, Diff, Field, Resource, ResourceId, Result,
    Schema,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VpcInfo {
    pub uniq_vpc_id: String,
    pub region: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreatePrivateZoneRequest<'a> {
    domain: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remark: Option<&'a str>,
    dns_forward_status: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vpc_set: Vec<VpcInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreatePrivateZoneResponse {
    zone_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ZoneIdRequest<'a> {
    zone_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModifyPrivateZoneRequest<'a> {
    zone_id: &'a str,
    remark: &'a str,
    dns_forward_status: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ModifyPrivateZoneVpcRequest<'a> {
    zone_id: &'a str,
    vpc_set: Vec<VpcInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribePrivateZoneResponse {
    private_zone: Option<PrivateZone>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct PrivateZone {
    pub zone_id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub remark: String,
    #[serde(default)]
    pub dns_forward_status: String,
    #[serde(default)]
    pub vpc_set: Vec<VpcInfo>,
    #[serde(default)]
    pub record_count: u64,
    #[serde(default)]
    pub status: String,
}

impl PrivateZone {
    pub(crate) fn to_json(&self) -> serde_json::Value {
        json!({
            "zone_id": self.zone_id,
            "domain": self.domain,
            "remark": self.remark,
            "dns_forward_status": self.dns_forward_status,
            "vpc_set": vpc_set_to_json(&self.vpc_set),
            "record_count": self.record_count,
            "status": self.status,
        })
    }
}

fn vpc_set_to_json(vpcs: &[VpcInfo]) -> serde_json::Value {
    vpcs.iter()
        .map(|v| json!({"uniq_vpc_id": v.uniq_vpc_id, "region": v.region}))
        .collect()
}

/// `vpc_set` entries from configuration
///
/// Each entry must be exactly `{uniq_vpc_id, region}`.
fn vpc_set_from_config(config: &Attributes) -> Result<Vec<VpcInfo>> {
    let Some(items) = config.get("vpc_set").and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let invalid = || {
                CloudError::InvalidConfig(format!(
                    "vpc_set[{}]: expected {{uniq_vpc_id, region}} strings, got {}",
                    index, item
                ))
            };
            let fields = item.as_object().ok_or_else(invalid)?;
            if fields.len() != 2 {
                return Err(invalid());
            }
            let field = |name: &str| {
                fields
                    .get(name)
                    .and_then(|v| v.as_str())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .ok_or_else(invalid)
            };
            Ok(VpcInfo {
                uniq_vpc_id: field("uniq_vpc_id")?,
                region: field("region")?,
            })
        })
        .collect()
}

pub struct PrivateDnsZone {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl PrivateDnsZone {
    pub const TYPE: &'static str = "tencentcloud_private_dns_zone";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("Private DNS zone resolvable from bound VPCs")
            .field(
                Field::string("domain")
                    .required()
                    .force_new()
                    .description("Zone apex, e.g. internal.example.com"),
            )
            .field(Field::string("remark").optional())
            .field(
                Field::string("dns_forward_status")
                    .optional()
                    .default_value(json!("DISABLED"))
                    .description("ENABLED or DISABLED"),
            )
            .field(
                Field::object_list("vpc_set")
                    .optional()
                    .description("VPCs as {uniq_vpc_id, region} objects"),
            )
            .field(Field::int("record_count").computed())
            .field(Field::string("status").computed());

        Self { api, schema }
    }
}

#[async_trait]
impl Resource for PrivateDnsZone {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn validate(&self, config: &Attributes) -> Result<()> {
        vpc_set_from_config(config).map(|_| ())
    }

    async fn create(&self, ctx: &Context, config: &Attributes) -> Result<ResourceId> {
        let body = CreatePrivateZoneRequest {
            domain: config.get_str("domain").unwrap_or_default(),
            remark: config.get_str("remark"),
            dns_forward_status: config.get_str("dns_forward_status").unwrap_or("DISABLED"),
            vpc_set: vpc_set_from_config(config)?,
        };
        let response: CreatePrivateZoneResponse = call(
            ctx,
            self.api.as_ref(),
            request(PRIVATE_DNS, "CreatePrivateZone", &body)?,
            ctx.write_timeout(),
            &[],
        )
        .await?;

        ResourceId::single(response.zone_id)
    }

    async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>> {
        let response: Option<DescribePrivateZoneResponse> = call_optional(
            ctx,
            self.api.as_ref(),
            request(
                PRIVATE_DNS,
                "DescribePrivateZone",
                &ZoneIdRequest {
                    zone_id: id.segment(0),
                },
            )?,
            ctx.read_timeout(),
            &[],
        )
        .await?;

        let Some(zone) = response.and_then(|r| r.private_zone) else {
            return Ok(None);
        };

        let mut attrs = to_attributes(zone.to_json());
        attrs.remove("zone_id");
        if zone.remark.is_empty() {
            attrs.remove("remark");
        }
        if zone.vpc_set.is_empty() {
            attrs.remove("vpc_set");
        }
        Ok(Some(attrs))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        config: &Attributes,
        diff: &Diff,
    ) -> Result<()> {
        let zone_id = id.segment(0);
        let vpc_set = vpc_set_from_config(config)?;

        if diff.contains("remark") || diff.contains("dns_forward_status") {
            let body = ModifyPrivateZoneRequest {
                zone_id,
                remark: config.get_str("remark").unwrap_or_default(),
                dns_forward_status: config.get_str("dns_forward_status").unwrap_or("DISABLED"),
            };
            call_unit(
                ctx,
                self.api.as_ref(),
                request(PRIVATE_DNS, "ModifyPrivateZone", &body)?,
                &[],
            )
            .await?;
        }

        if diff.contains("vpc_set") {
            let body = ModifyPrivateZoneVpcRequest {
                zone_id,
                vpc_set,
            };
            call_unit(
                ctx,
                self.api.as_ref(),
                request(PRIVATE_DNS, "ModifyPrivateZoneVpc", &body)?,
                &[],
            )
            .await?;
        }

        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        call_unit(
            ctx,
            self.api.as_ref(),
            request(
                PRIVATE_DNS,
                "DeletePrivateZone",
                &ZoneIdRequest {
                    zone_id: id.segment(0),
                },
            )?,
            &[],
        )
        .await
    }
}
