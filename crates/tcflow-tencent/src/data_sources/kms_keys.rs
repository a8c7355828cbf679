//! `tencentcloud_kms_keys`: list KMS keys matching filters

use crate::client::{KMS, TencentApi};
use crate::helper::{call, request};
use crate::resources::kms_key::KeyMetadata;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, CloudError, Context, DataResult, DataSource, Field, Result, Schema,
    ids_hash,
};

const PAGE_SIZE: u64 = 100;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ListKeyDetailRequest<'a> {
    offset: u64,
    limit: u64,
    /// 0: all keys, 1: enabled, 2: disabled, 3: pending delete, 4: pending import
    #[serde(skip_serializing_if = "Option::is_none")]
    key_state: Option<u64>,
    /// 0: descending by creation time, 1: ascending
    #[serde(skip_serializing_if = "Option::is_none")]
    order_type: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_key_alias: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_usage: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListKeyDetailResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    key_metadatas: Vec<KeyMetadata>,
}

pub struct KmsKeys {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl KmsKeys {
    pub const TYPE: &'static str = "tencentcloud_kms_keys";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("KMS keys filtered by state, alias or usage")
            .field(
                Field::int("key_state")
                    .optional()
                    .description(
                        "0 all, 1 enabled, 2 disabled, 3 pending delete, 4 pending import",
                    ),
            )
            .field(
                Field::int("order_type")
                    .optional()
                    .description("0 newest first, 1 oldest first"),
            )
            .field(
                Field::string("search_key_alias")
                    .optional()
                    .description("Substring match on the alias"),
            )
            .field(Field::string("key_usage").optional())
            .field(Field::object_list("key_list").computed());

        Self { api, schema }
    }

    /// Integer filter that must fit the API's unsigned range
    fn unsigned(args: &Attributes, key: &str, max: u64) -> Result<Option<u64>> {
        let Some(value) = args.get(key).filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        match value.as_u64() {
            Some(n) if n <= max => Ok(Some(n)),
            _ => Err(CloudError::InvalidConfig(format!(
                "`{}` must be an integer between 0 and {}, got {}",
                key, max, value
            ))),
        }
    }
}

#[async_trait]
impl DataSource for KmsKeys {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn read(&self, ctx: &Context, args: &Attributes) -> Result<DataResult> {
        let key_state = Self::unsigned(args, "key_state", 4)?;
        let order_type = Self::unsigned(args, "order_type", 1)?;
        let mut keys = Vec::new();
        let mut offset = 0;

        loop {
            let body = ListKeyDetailRequest {
                offset,
                limit: PAGE_SIZE,
                key_state,
                order_type,
                search_key_alias: args.get_str("search_key_alias"),
                key_usage: args.get_str("key_usage"),
            };
            let page: ListKeyDetailResponse = call(
                ctx,
                self.api.as_ref(),
                request(KMS, "ListKeyDetail", &body)?,
                ctx.read_timeout(),
                &[],
            )
            .await?;

            let fetched = page.key_metadatas.len() as u64;
            keys.extend(page.key_metadatas);
            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }

        tracing::debug!("{} matched {} key(s)", Self::TYPE, keys.len());

        let ids: Vec<String> = keys.iter().map(|k| k.key_id.clone()).collect();
        let key_list: Vec<serde_json::Value> = keys.iter().map(KeyMetadata::to_json).collect();

        let mut attributes = args.clone();
        attributes.insert("key_list".to_string(), json!(key_list));

        Ok(DataResult {
            id: ids_hash(&ids),
            attributes,
        })
    }
}
