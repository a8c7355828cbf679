//! `tencentcloud_cfs_access_group`: CFS permission group

use crate::client::{CFS, TencentApi};
use crate::helper::{call, call_optional, call_unit, request};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, Context, Diff, Field, Resource, ResourceId, Result, Schema,
};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateCfsPGroupRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    desc_info: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateCfsPGroupResponse {
    p_group_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UpdateCfsPGroupRequest<'a> {
    p_group_id: &'a str,
    name: &'a str,
    desc_info: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PGroupIdRequest<'a> {
    p_group_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeCfsPGroupsResponse {
    #[serde(default)]
    p_group_list: Vec<PGroup>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PGroup {
    p_group_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc_info: String,
    #[serde(default)]
    c_date: String,
}

pub struct CfsAccessGroup {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl CfsAccessGroup {
    pub const TYPE: &'static str = "tencentcloud_cfs_access_group";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("CFS permission group controlling client access")
            .field(Field::string("name").required())
            .field(Field::string("description").optional())
            .field(Field::string("create_time").computed());

        Self { api, schema }
    }
}

#[async_trait]
impl Resource for CfsAccessGroup {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    async fn create(&self, ctx: &Context, config: &Attributes) -> Result<ResourceId> {
        let body = CreateCfsPGroupRequest {
            name: config.get_str("name").unwrap_or_default(),
            desc_info: config.get_str("description"),
        };
        let response: CreateCfsPGroupResponse = call(
            ctx,
            self.api.as_ref(),
            request(CFS, "CreateCfsPGroup", &body)?,
            ctx.write_timeout(),
            &[],
        )
        .await?;

        ResourceId::single(response.p_group_id)
    }

    async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>> {
        // DescribeCfsPGroups has no ID filter
        let response: Option<DescribeCfsPGroupsResponse> = call_optional(
            ctx,
            self.api.as_ref(),
            request(CFS, "DescribeCfsPGroups", &json!({}))?,
            ctx.read_timeout(),
            &[],
        )
        .await?;

        let group = response.and_then(|r| {
            r.p_group_list
                .into_iter()
                .find(|g| g.p_group_id == id.segment(0))
        });
        let Some(group) = group else {
            return Ok(None);
        };

        let mut attrs = Attributes::new();
        attrs.insert("name".to_string(), json!(group.name));
        attrs.insert("create_time".to_string(), json!(group.c_date));
        if !group.desc_info.is_empty() {
            attrs.insert("description".to_string(), json!(group.desc_info));
        }
        Ok(Some(attrs))
    }

    async fn update(
        &self,
        ctx: &Context,
        id: &ResourceId,
        config: &Attributes,
        _diff: &Diff,
    ) -> Result<()> {
        let body = UpdateCfsPGroupRequest {
            p_group_id: id.segment(0),
            name: config.get_str("name").unwrap_or_default(),
            desc_info: config.get_str("description").unwrap_or_default(),
        };
        call_unit(
            ctx,
            self.api.as_ref(),
            request(CFS, "UpdateCfsPGroup", &body)?,
            &[],
        )
        .await
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        call_unit(
            ctx,
            self.api.as_ref(),
            request(
                CFS,
                "DeleteCfsPGroup",
                &PGroupIdRequest {
                    p_group_id: id.segment(0),
                },
            )?,
            &[],
        )
        .await
    }
}
