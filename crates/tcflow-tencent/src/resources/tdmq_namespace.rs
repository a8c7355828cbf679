//! `tencentcloud_tdmq_namespace`: Pulsar namespace (environment) in a TDMQ cluster
//!
//! Namespaces are only unique within their cluster, so the resource ID is
//! `environ_name#cluster_id`.

use crate::client::{TDMQ, TencentApi};
use crate::helper::{call, call_optional, call_unit, request};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tcflow_cloud::{
    Attributes, AttributesExt, CloudError, Context, Diff, Field, Resource, ResourceId, Result,
    Schema,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RetentionPolicy {
    time_in_minutes: i64,
    #[serde(rename = "SizeInMB")]
    size_in_mb: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnvironmentRequest<'a> {
    environment_id: &'a str,
    #[serde(rename = "MsgTTL")]
    msg_ttl: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    remark: Option<&'a str>,
    cluster_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    retention_policy: Option<RetentionPolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeEnvironmentsRequest<'a> {
    environment_id: &'a str,
    cluster_id: &'a str,
    offset: u64,
    limit: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeEnvironmentsResponse {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    environment_set: Vec<Environment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Environment {
    environment_id: String,
    #[serde(default)]
    remark: String,
    #[serde(rename = "MsgTTL", default)]
    msg_ttl: i64,
    #[serde(default)]
    topic_num: i64,
    #[serde(default)]
    retention_policy: Option<RetentionPolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteEnvironmentsRequest<'a> {
    environment_ids: Vec<&'a str>,
    cluster_id: &'a str,
}

const PAGE_SIZE: u64 = 20;

pub struct TdmqNamespace {
    api: Arc<dyn TencentApi>,
    schema: Schema,
}

impl TdmqNamespace {
    pub const TYPE: &'static str = "tencentcloud_tdmq_namespace";

    pub fn new(api: Arc<dyn TencentApi>) -> Self {
        let schema = Schema::new("Pulsar namespace in a TDMQ cluster")
            .field(Field::string("environ_name").required().force_new())
            .field(Field::string("cluster_id").required().force_new())
            .field(
                Field::int("msg_ttl")
                    .required()
                    .description("Unacknowledged message TTL in seconds"),
            )
            .field(Field::string("remark").optional())
            .field(
                Field::int("retention_time_in_minutes")
                    .optional()
                    .computed()
                    .description("Set together with retention_size_in_mb"),
            )
            .field(
                Field::int("retention_size_in_mb")
                    .optional()
                    .computed()
                    .description("Set together with retention_time_in_minutes"),
            )
            .field(Field::int("topic_num").computed());

        Self { api, schema }
    }

    /// The API only accepts a complete retention policy
    fn retention_policy(config: &Attributes) -> Result<Option<RetentionPolicy>> {
        let minutes = config.get_as::<i64>("retention_time_in_minutes");
        let size = config.get_as::<i64>("retention_size_in_mb");
        match (minutes, size) {
            (None, None) => Ok(None),
            (Some(time_in_minutes), Some(size_in_mb)) => Ok(Some(RetentionPolicy {
                time_in_minutes,
                size_in_mb,
            })),
            (Some(_), None) | (None, Some(_)) => Err(CloudError::InvalidConfig(
                "`retention_time_in_minutes` and `retention_size_in_mb` must be set together"
                    .to_string(),
            )),
        }
    }

    fn body<'a>(
        environ_name: &'a str,
        cluster_id: &'a str,
        config: &'a Attributes,
    ) -> Result<EnvironmentRequest<'a>> {
        let retention_policy = Self::retention_policy(config)?;

        Ok(EnvironmentRequest {
            environment_id: environ_name,
            msg_ttl: config.get_as::<i64>("msg_ttl").unwrap_or_default(),
            remark: config.get_str("remark"),
            cluster_id,
            retention_policy,
        })
    }

    /// Find the namespace by exact name; the API filter is a fuzzy match
    async fn find(
        &self,
        ctx: &Context,
        environ_name: &str,
        cluster_id: &str,
    ) -> Result<Option<Environment>> {
        let mut offset = 0;
        loop {
            let page: Option<DescribeEnvironmentsResponse> = call_optional(
                ctx,
                self.api.as_ref(),
                request(
                    TDMQ,
                    "DescribeEnvironments",
                    &DescribeEnvironmentsRequest {
                        environment_id: environ_name,
                        cluster_id,
                        offset,
                        limit: PAGE_SIZE,
                    },
                )?,
                ctx.read_timeout(),
                &[],
            )
            .await?;

            let Some(page) = page else {
                return Ok(None);
            };
            let fetched = page.environment_set.len() as u64;
            if let Some(env) = page
                .environment_set
                .into_iter()
                .find(|e| e.environment_id == environ_name)
            {
                return Ok(Some(env));
            }

            offset += fetched;
            if fetched == 0 || offset >= page.total_count {
                return Ok(None);
            }
        }
    }
}

#[async_trait]
impl Resource for TdmqNamespace {
    fn type_name(&self) -> &'static str {
        Self::TYPE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn id_segments(&self) -> usize {
        2
    }

    fn validate(&self, config: &Attributes) -> Result<()> {
        Self::retention_policy(config).map(|_| ())
    }

    async fn create(&self, ctx: &Context, config: &Attributes) -> Result<ResourceId> {
        let environ_name = config
            .get_str("environ_name")
            .ok_or_else(|| CloudError::InvalidConfig("missing `environ_name`".to_string()))?;
        let cluster_id = config
            .get_str("cluster_id")
            .ok_or_else(|| CloudError::InvalidConfig("missing `cluster_id`".to_string()))?;

        let body = Self::body(environ_name, cluster_id, config)?;
        let _: serde_json::Value = call(
            ctx,
            self.api.as_ref(),
            request(TDMQ, "CreateEnvironment", &body)?,
            ctx.write_timeout(),
            &[],
        )
        .await?;

        ResourceId::compose([environ_name, cluster_id])
    }

    async fn read(&self, ctx: &Context, id: &ResourceId) -> Result<Option<Attributes>> {
        let environ_name = id.segment(0);
        let cluster_id = id.segment(1);

        let Some(env) = self.find(ctx, environ_name, cluster_id).await? else {
            return Ok(None);
        };

        let mut attrs = Attributes::new();
        attrs.insert("environ_name".to_string(), json!(env.environment_id));
        attrs.insert("cluster_id".to_string(), json!(cluster_id));
        attrs.insert("msg_ttl".to_string(), json!(env.msg_ttl));
        attrs.insert("topic_num".to_string(), json!(env.topic_num));
        if !env.remark.is_empty() {
            attrs.insert("remark".to_string(), json!(env.remark));
        }
        if let Some(policy) = env.retention_policy {
            attrs.insert(
                "retention_time_in_minutes".to_string(),
                json!(policy.time_in_minutes),
            );
            attrs.insert(
                "retention_size_in_mb".to_string(),
                json!(policy.size_in_mb),
            );
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
        // Every mutable attribute goes through the same call
        let mut body = Self::body(id.segment(0), id.segment(1), config)?;
        // An omitted Remark leaves the old one in place
        body.remark = Some(body.remark.unwrap_or_default());
        call_unit(
            ctx,
            self.api.as_ref(),
            request(TDMQ, "ModifyEnvironmentAttributes", &body)?,
            &[],
        )
        .await
    }

    async fn delete(&self, ctx: &Context, id: &ResourceId) -> Result<()> {
        call_unit(
            ctx,
            self.api.as_ref(),
            request(
                TDMQ,
                "DeleteEnvironments",
                &DeleteEnvironmentsRequest {
                    environment_ids: vec![id.segment(0)],
                    cluster_id: id.segment(1),
                },
            )?,
            &[],
        )
        .await
    }
}
