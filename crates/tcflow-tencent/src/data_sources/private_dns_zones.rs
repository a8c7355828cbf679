//! `tencentcloud_private_dns_zones`: list PrivateDNS zones

use crate::client::{PRIVATE_DNS, TencentApi};
use crate::helper::{call, request};
use crate::resources::private_dns_zone::PrivateZone;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, Context, DataResult, DataSource, Field, Result, Schema, ids_hash,
};

const PAGE_SIZE: u64 = 100;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Filter<'a> {
    name: &'a str,
    values: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribePrivateZoneListRequest<'a> {
    offset: u64,
    limit: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<Filter<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribePrivateZoneListResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    private_zone_set: Vec<PrivateZone>,
}

pub struct PrivateDnsZones {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl PrivateDnsZones {
    pub const TYPE: &'static str = "tencentcloud_private_dns_zones";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("PrivateDNS zones filtered by domain or ID")
            .field(Field::string("domain").optional())
            .field(Field::string("zone_id").optional())
            .field(Field::object_list("zone_list").computed());

        Self { api, schema }
    }
}

fn filters(args: &Attributes) -> Vec<Filter<'_>> {
    [("Domain", "domain"), ("ZoneId", "zone_id")]
        .into_iter()
        .filter_map(|(name, key)| {
            args.get_str(key).map(|value| Filter {
                name,
                values: vec![value],
            })
        })
        .collect()
}

#[async_trait]
impl DataSource for PrivateDnsZones {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &Context, args: &Attributes) -> Result<DataResult> {
        let mut zones = Vec::new();
        let mut offset = 0;

        loop {
            let body = DescribePrivateZoneListRequest {
                offset,
                limit: PAGE_SIZE,
                filters: filters(args),
            };
            let page: DescribePrivateZoneListResponse = call(
                ctx,
                self.api.as_ref(),
                request(PRIVATE_DNS, "DescribePrivateZoneList", &body)?,
                ctx.read_timeout(),
                &[],
            )
            .await?;

            let fetched = page.private_zone_set.len() as u64;
            zones.extend(page.private_zone_set);
            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }

        let ids: Vec<String> = zones.iter().map(|z| z.zone_id.clone()).collect();
        let zone_list: Vec<serde_json::Value> = zones.iter().map(PrivateZone::to_json).collect();

        let mut attributes = args.clone();
        attributes.insert("zone_list".to_string(), json!(zone_list));

        Ok(DataResult {
            id: ids_hash(&ids),
            attributes,
        })
    }
}
