//! `tencentcloud_kms_key`: customer master key in KMS

use crate::client::{KMS, TencentApi};
use crate::helper::{call, call_optional, call_unit, request, to_attributes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, Context, Diff, Field, Resource, ResourceId, Result, Schema,
};

/// KMS reports a missing key as unavailable rather than not found
const NOT_FOUND_CODES: &[&str] = &["ResourceUnavailable.CmkNotFound"];

/// Days a key stays in `PendingDelete` before KMS removes it
const PENDING_WINDOW_IN_DAYS: u64 = 7;

const STATE_ENABLED: &str = "Enabled";
const STATE_ARCHIVED: &str = "Archived";
const STATE_PENDING_DELETE: &str = "PendingDelete";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateKeyRequest<'a> {
    alias: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    key_usage: &'a str,
    r#type: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateKeyResponse {
    key_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct KeyIdRequest<'a> {
    key_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateAliasRequest<'a> {
    key_id: &'a str,
    alias: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateKeyDescriptionRequest<'a> {
    key_id: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ScheduleKeyDeletionRequest<'a> {
    key_id: &'a str,
    pending_window_in_days: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeKeyResponse {
    key_metadata: Option<KeyMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct KeyMetadata {
    pub key_id: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub key_state: String,
    #[serde(default)]
    pub key_usage: String,
    #[serde(default)]
    pub key_rotation_enabled: bool,
    #[serde(default)]
    pub create_time: u64,
}

impl KeyMetadata {
    pub(crate) fn to_json(&self) -> serde_json::Value {
        json!({
            "key_id": self.key_id,
            "alias": self.alias,
            "description": self.description,
            "key_state": self.key_state,
            "key_usage": self.key_usage,
            "key_rotation_enabled": self.key_rotation_enabled,
            "create_time": self.create_time,
        })
    }
}

pub struct KmsKey {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl KmsKey {
    pub const TYPE: &'static str = "tencentcloud_kms_key";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("Customer master key managed by KMS")
            .field(
                Field::string("alias")
                    .required()
                    .description("Key alias, unique within the account"),
            )
            .field(Field::string("description").optional())
            .field(
                Field::string("key_usage")
                    .optional()
                    .force_new()
                    .default_value(json!("ENCRYPT_DECRYPT"))
                    .description("ENCRYPT_DECRYPT, ASYMMETRIC_DECRYPT_RSA_2048, ..."),
            )
            .field(
                Field::bool("is_enabled")
                    .optional()
                    .default_value(json!(true)),
            )
            .field(
                Field::bool("is_archived")
                    .optional()
                    .default_value(json!(false)),
            )
            .field(
                Field::bool("key_rotation_enabled")
                    .optional()
                    .default_value(json!(false)),
            )
            .field(Field::string("key_state").computed())
            .field(Field::int("create_time").computed());

        Self { api, schema }
    }

    async fn describe(&self, ctx: &Context, key_id: &str) -> Result<Option<KeyMetadata>> {
        let response: Option<DescribeKeyResponse> = call_optional(
            ctx,
            self.api.as_ref(),
            request(KMS, "DescribeKey", &KeyIdRequest { key_id })?,
            ctx.read_timeout(),
            NOT_FOUND_CODES,
        )
        .await?;
        Ok(response.and_then(|r| r.key_metadata))
    }

    async fn key_action(&self, ctx: &Context, action: &'static str, key_id: &str) -> Result<()> {
        tracing::debug!("kms:{} {}", action, key_id);
        call_unit(
            ctx,
            self.api.as_ref(),
            request(KMS, action, &KeyIdRequest { key_id })?,
            NOT_FOUND_CODES,
        )
        .await
    }

    async fn set_enabled(&self, ctx: &Context, key_id: &str, enabled: bool) -> Result<()> {
        let action = if enabled { "EnableKey" } else { "DisableKey" };
        self.key_action(ctx, action, key_id).await
    }

    async fn set_rotation(&self, ctx: &Context, key_id: &str, enabled: bool) -> Result<()> {
        let action = if enabled {
            "EnableKeyRotation"
        } else {
            "DisableKeyRotation"
        };
        self.key_action(ctx, action, key_id).await
    }

    async fn set_archived(&self, ctx: &Context, key_id: &str, archived: bool) -> Result<()> {
        let action = if archived {
            "ArchiveKey"
        } else {
            "CancelKeyArchive"
        };
        self.key_action(ctx, action, key_id).await
    }
}

#[async_trait]
impl Resource for KmsKey {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &Context, config: &Attributes) -> Result<ResourceId> {
        let body = CreateKeyRequest {
            alias: config.get_str("alias").unwrap_or_default(),
            description: config.get_str("description"),
            key_usage: config.get_str("key_usage").unwrap_or("ENCRYPT_DECRYPT"),
            r#type: 1,
        };
        let response: CreateKeyResponse = call(
            ctx,
            self.api.as_ref(),
            request(KMS, "CreateKey", &body)?,
            ctx.write_timeout(),
            &[],
        )
        .await?;
        let key_id = response.key_id;

        let archived = config.get_as::<bool>("is_archived").unwrap_or(false);
        let enabled = config.get_as::<bool>("is_enabled").unwrap_or(true);

        if config.get_as::<bool>("key_rotation_enabled").unwrap_or(false) {
            self.set_rotation(ctx, &key_id, true).await?;
        }
        if archived {
            self.set_archived(ctx, &key_id, true).await?;
        } else if !enabled {
            self.set_enabled(ctx, &key_id, false).await?;
        }

        ResourceId::single(key_id)
    }

    async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>> {
        let Some(metadata) = self.describe(ctx, id.segment(0)).await? else {
            return Ok(None);
        };
        if metadata.key_state == STATE_PENDING_DELETE {
            return Ok(None);
        }

        let mut attrs = to_attributes(metadata.to_json());
        attrs.remove("key_id");
        if metadata.description.is_empty() {
            attrs.remove("description");
        }

        let archived = metadata.key_state == STATE_ARCHIVED;
        attrs.insert("is_archived".to_string(), json!(archived));
        // An archived key has no enabled flag of its own
        if !archived {
            attrs.insert(
                "is_enabled".to_string(),
                json!(metadata.key_state == STATE_ENABLED),
            );
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
        let key_id = id.segment(0);
        let archived = config.get_as::<bool>("is_archived").unwrap_or(false);

        if diff.contains("is_archived") && !archived {
            self.set_archived(ctx, key_id, false).await?;
        }

        if diff.contains("alias") {
            let body = UpdateAliasRequest {
                key_id,
                alias: config.get_str("alias").unwrap_or_default(),
            };
            call_unit(
                ctx,
                self.api.as_ref(),
                request(KMS, "UpdateAlias", &body)?,
                NOT_FOUND_CODES,
            )
            .await?;
        }

        if diff.contains("description") {
            let body = UpdateKeyDescriptionRequest {
                key_id,
                description: config.get_str("description").unwrap_or_default(),
            };
            call_unit(
                ctx,
                self.api.as_ref(),
                request(KMS, "UpdateKeyDescription", &body)?,
                NOT_FOUND_CODES,
            )
            .await?;
        }

        if diff.contains("key_rotation_enabled") {
            let rotation = config
                .get_as::<bool>("key_rotation_enabled")
                .unwrap_or(false);
            self.set_rotation(ctx, key_id, rotation).await?;
        }

        if !archived && (diff.contains("is_enabled") || diff.contains("is_archived")) {
            let enabled = config.get_as::<bool>("is_enabled").unwrap_or(true);
            // Cancelling an archive leaves the key enabled
            if !enabled || !diff.contains("is_archived") {
                self.set_enabled(ctx, key_id, enabled).await?;
            }
        }

        if diff.contains("is_archived") && archived {
            self.set_archived(ctx, key_id, true).await?;
        }

        Ok(())
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        let key_id = id.segment(0);
        let Some(metadata) = self.describe(ctx, key_id).await? else {
            return Ok(());
        };

        match metadata.key_state.as_str() {
            STATE_PENDING_DELETE => return Ok(()),
            STATE_ARCHIVED => {
                self.set_archived(ctx, key_id, false).await?;
                self.set_enabled(ctx, key_id, false).await?;
            }
            STATE_ENABLED => self.set_enabled(ctx, key_id, false).await?,
            _ => {}
        }

        let body = ScheduleKeyDeletionRequest {
            key_id,
            pending_window_in_days: PENDING_WINDOW_IN_DAYS,
        };
        call_unit(
            ctx,
            self.api.as_ref(),
            request(KMS, "ScheduleKeyDeletion", &body)?,
            NOT_FOUND_CODES,
        )
        .await
    }
}
