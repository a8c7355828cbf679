//! In-memory stand-in for the Tencent Cloud services the provider uses

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use tcflow_cloud::{Attributes, Context, Lifecycle, Resource, ResourceState, RetryConfig};
use tcflow_tencent::{ApiRequest, TencentApi, TencentError};

type ApiResult = Result<Value, TencentError>;

#[derive(Default)]
struct Inner {
    keys: BTreeMap<String, Value>,
    zones: BTreeMap<String, Value>,
    environments: BTreeMap<(String, String), Value>,
    groups: BTreeMap<String, Value>,
    calls: Vec<String>,
    faults: VecDeque<(String, String)>,
    seq: u64,
}

impl Inner {
    fn next_id(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{}-{:08}", prefix, self.seq)
    }
}

#[derive(Default)]
pub struct FakeTencent {
    inner: Mutex<Inner>,
}

#[allow(dead_code)]
impl FakeTencent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// `service:Action` of every call received, in order
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    /// Fail the next `times` calls of `action` with `code`
    pub fn inject(&self, action: &str, code: &str, times: usize) {
        let mut inner = self.inner.lock().unwrap();
        for _ in 0..times {
            inner
                .faults
                .push_back((action.to_string(), code.to_string()));
        }
    }

    /// Remove every stored entity with this ID, as if deleted out of band
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.keys.remove(id);
        inner.zones.remove(id);
        inner.groups.remove(id);
        inner.environments.retain(|(env, _), _| env != id);
    }

    pub fn key_state(&self, key_id: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .keys
            .get(key_id)
            .and_then(|k| k["KeyState"].as_str())
            .map(str::to_string)
    }
}

/// Context with short backoff so retried calls finish quickly
#[allow(dead_code)]
pub fn fast_context() -> Context {
    Context::new().with_retry(RetryConfig {
        initial_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(5),
        backoff_multiplier: 2.0,
    })
}

#[allow(dead_code)]
pub fn config(value: Value) -> Attributes {
    serde_json::from_value(value).unwrap()
}

/// Every settable field of the prepared configuration is reflected in state
#[allow(dead_code)]
pub fn assert_reflects_config(resource: &dyn Resource, config: &Attributes, state: &ResourceState) {
    let ctx = Context::new();
    let prepared = Lifecycle::new(resource, &ctx).prepare(config).unwrap();
    for field in resource.schema().settable_fields() {
        assert_eq!(
            state.attributes.get(&field.name),
            prepared.get(&field.name),
            "field `{}` of {}",
            field.name,
            resource.type_name()
        );
    }
}

fn api_error(code: &str) -> TencentError {
    TencentError::Api {
        code: code.to_string(),
        message: format!("fake: {}", code),
        request_id: "fake-request".to_string(),
    }
}

fn str_param<'a>(payload: &'a Value, name: &str) -> &'a str {
    payload[name].as_str().unwrap_or_default()
}

fn page(items: Vec<Value>, payload: &Value) -> (u64, Vec<Value>) {
    let total = items.len() as u64;
    let offset = payload["Offset"].as_u64().unwrap_or(0) as usize;
    let limit = payload["Limit"].as_u64().unwrap_or(20) as usize;
    (total, items.into_iter().skip(offset).take(limit).collect())
}

fn set(entity: &mut Value, field: &str, value: Value) {
    if let Some(obj) = entity.as_object_mut() {
        obj.insert(field.to_string(), value);
    }
}

#[async_trait]
impl TencentApi for FakeTencent {
    async fn call(&self, request: ApiRequest) -> ApiResult {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(request.operation());

        let fault = inner
            .faults
            .iter()
            .position(|(action, _)| action == request.action);
        if let Some(index) = fault {
            if let Some((_, code)) = inner.faults.remove(index) {
                return Err(api_error(&code));
            }
        }

        let payload = &request.payload;
        let mut response = match request.service.name {
            "kms" => kms(&mut inner, request.action, payload),
            "privatedns" => private_dns(&mut inner, request.action, payload),
            "tdmq" => tdmq(&mut inner, request.action, payload),
            "cfs" => cfs(&mut inner, request.action, payload),
            "sts" => Ok(json!({
                "AccountId": "100000000001",
                "Arn": "qcs::cam::uin/100000000001:uin/100000000001",
                "UserId": "100000000001",
            })),
            _ => Err(api_error("InvalidAction")),
        }?;

        set(&mut response, "RequestId", json!("fake-request"));
        Ok(response)
    }
}

fn kms(inner: &mut Inner, action: &str, p: &Value) -> ApiResult {
    let key_id = str_param(p, "KeyId").to_string();
    let not_found = || api_error("ResourceUnavailable.CmkNotFound");

    match action {
        "CreateKey" => {
            let id = inner.next_id("kms");
            let key = json!({
                "KeyId": id,
                "Alias": p["Alias"],
                "Description": p.get("Description").cloned().unwrap_or(json!("")),
                "KeyState": "Enabled",
                "KeyUsage": p["KeyUsage"],
                "KeyRotationEnabled": false,
                "CreateTime": 1_700_000_000u64,
            });
            inner.keys.insert(id.clone(), key);
            Ok(json!({"KeyId": id}))
        }
        "DescribeKey" => {
            let key = inner.keys.get(&key_id).ok_or_else(not_found)?;
            Ok(json!({"KeyMetadata": key}))
        }
        "ListKeyDetail" => {
            let alias = str_param(p, "SearchKeyAlias");
            let wanted = match p["KeyState"].as_u64().unwrap_or(0) {
                1 => Some("Enabled"),
                2 => Some("Disabled"),
                3 => Some("PendingDelete"),
                _ => None,
            };
            let matched: Vec<Value> = inner
                .keys
                .values()
                .filter(|k| k["Alias"].as_str().unwrap_or_default().contains(alias))
                .filter(|k| wanted.is_none_or(|s| k["KeyState"] == s))
                .cloned()
                .collect();
            let (total, items) = page(matched, p);
            Ok(json!({"TotalCount": total, "KeyMetadatas": items}))
        }
        _ => {
            let key = inner.keys.get_mut(&key_id).ok_or_else(not_found)?;
            match action {
                "UpdateAlias" => set(key, "Alias", p["Alias"].clone()),
                "UpdateKeyDescription" => set(key, "Description", p["Description"].clone()),
                "EnableKey" | "CancelKeyArchive" => set(key, "KeyState", json!("Enabled")),
                "DisableKey" => set(key, "KeyState", json!("Disabled")),
                "ArchiveKey" => set(key, "KeyState", json!("Archived")),
                "EnableKeyRotation" => set(key, "KeyRotationEnabled", json!(true)),
                "DisableKeyRotation" => set(key, "KeyRotationEnabled", json!(false)),
                "ScheduleKeyDeletion" => {
                    if key["KeyState"] != "Disabled" {
                        return Err(api_error("UnsupportedOperation.NotUserCreatedCmk"));
                    }
                    set(key, "KeyState", json!("PendingDelete"));
                }
                _ => return Err(api_error("InvalidAction")),
            }
            Ok(json!({}))
        }
    }
}

fn private_dns(inner: &mut Inner, action: &str, p: &Value) -> ApiResult {
    let zone_id = str_param(p, "ZoneId").to_string();
    let not_found = || api_error("ResourceNotFound");

    match action {
        "CreatePrivateZone" => {
            let id = inner.next_id("zone");
            let zone = json!({
                "ZoneId": id,
                "Domain": p["Domain"],
                "Remark": p.get("Remark").cloned().unwrap_or(json!("")),
                "DnsForwardStatus": p["DnsForwardStatus"],
                "VpcSet": p.get("VpcSet").cloned().unwrap_or(json!([])),
                "RecordCount": 0,
                "Status": "ENABLED",
            });
            inner.zones.insert(id.clone(), zone);
            Ok(json!({"ZoneId": id, "Domain": p["Domain"]}))
        }
        "DescribePrivateZone" => {
            let zone = inner.zones.get(&zone_id).ok_or_else(not_found)?;
            Ok(json!({"PrivateZone": zone}))
        }
        "DescribePrivateZoneList" => {
            let filters: Vec<(String, String)> = p["Filters"]
                .as_array()
                .map(|fs| {
                    fs.iter()
                        .map(|f| {
                            (
                                str_param(f, "Name").to_string(),
                                f["Values"][0].as_str().unwrap_or_default().to_string(),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            let matched: Vec<Value> = inner
                .zones
                .values()
                .filter(|z| filters.iter().all(|(name, value)| z[name.as_str()] == value.as_str()))
                .cloned()
                .collect();
            let (total, items) = page(matched, p);
            Ok(json!({"TotalCount": total, "PrivateZoneSet": items}))
        }
        "ModifyPrivateZone" => {
            let zone = inner.zones.get_mut(&zone_id).ok_or_else(not_found)?;
            set(zone, "Remark", p["Remark"].clone());
            set(zone, "DnsForwardStatus", p["DnsForwardStatus"].clone());
            Ok(json!({}))
        }
        "ModifyPrivateZoneVpc" => {
            let zone = inner.zones.get_mut(&zone_id).ok_or_else(not_found)?;
            set(zone, "VpcSet", p["VpcSet"].clone());
            Ok(json!({}))
        }
        "DeletePrivateZone" => {
            inner.zones.remove(&zone_id).ok_or_else(not_found)?;
            Ok(json!({}))
        }
        _ => Err(api_error("InvalidAction")),
    }
}

fn tdmq(inner: &mut Inner, action: &str, p: &Value) -> ApiResult {
    let cluster_id = str_param(p, "ClusterId").to_string();
    let not_found = || api_error("ResourceNotFound.Environment");

    match action {
        "CreateEnvironment" => {
            let key = (str_param(p, "EnvironmentId").to_string(), cluster_id);
            let mut env = Map::new();
            env.insert("EnvironmentId".to_string(), p["EnvironmentId"].clone());
            env.insert("MsgTTL".to_string(), p["MsgTTL"].clone());
            env.insert(
                "Remark".to_string(),
                p.get("Remark").cloned().unwrap_or(json!("")),
            );
            env.insert("TopicNum".to_string(), json!(0));
            if let Some(policy) = p.get("RetentionPolicy") {
                env.insert("RetentionPolicy".to_string(), policy.clone());
            }
            inner.environments.insert(key, Value::Object(env));
            Ok(json!({"EnvironmentId": p["EnvironmentId"], "MsgTTL": p["MsgTTL"]}))
        }
        "DescribeEnvironments" => {
            let needle = str_param(p, "EnvironmentId");
            let matched: Vec<Value> = inner
                .environments
                .iter()
                .filter(|((env, cluster), _)| *cluster == cluster_id && env.contains(needle))
                .map(|(_, v)| v.clone())
                .collect();
            let (total, items) = page(matched, p);
            Ok(json!({"TotalCount": total, "EnvironmentSet": items}))
        }
        "ModifyEnvironmentAttributes" => {
            let key = (str_param(p, "EnvironmentId").to_string(), cluster_id);
            let env = inner.environments.get_mut(&key).ok_or_else(not_found)?;
            set(env, "MsgTTL", p["MsgTTL"].clone());
            // Attributes missing from the request keep their value
            if let Some(remark) = p.get("Remark") {
                set(env, "Remark", remark.clone());
            }
            if let Some(policy) = p.get("RetentionPolicy") {
                set(env, "RetentionPolicy", policy.clone());
            }
            Ok(json!({}))
        }
        "DeleteEnvironments" => {
            let ids: Vec<String> = p["EnvironmentIds"]
                .as_array()
                .map(|ids| {
                    ids.iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            for id in ids {
                inner
                    .environments
                    .remove(&(id, cluster_id.clone()))
                    .ok_or_else(not_found)?;
            }
            Ok(json!({}))
        }
        _ => Err(api_error("InvalidAction")),
    }
}

fn cfs(inner: &mut Inner, action: &str, p: &Value) -> ApiResult {
    let group_id = str_param(p, "PGroupId").to_string();
    let not_found = || api_error("ResourceNotFound.PgroupNotFound");

    match action {
        "CreateCfsPGroup" => {
            let id = inner.next_id("pgroup");
            let group = json!({
                "PGroupId": id,
                "Name": p["Name"],
                "DescInfo": p.get("DescInfo").cloned().unwrap_or(json!("")),
                "CDate": "2024-01-01 00:00:00",
                "BindCfsNum": 0,
            });
            inner.groups.insert(id.clone(), group);
            Ok(json!({"PGroupId": id, "Name": p["Name"]}))
        }
        "DescribeCfsPGroups" => {
            let groups: Vec<Value> = inner.groups.values().cloned().collect();
            Ok(json!({"PGroupList": groups}))
        }
        "UpdateCfsPGroup" => {
            let group = inner.groups.get_mut(&group_id).ok_or_else(not_found)?;
            set(group, "Name", p["Name"].clone());
            set(group, "DescInfo", p["DescInfo"].clone());
            Ok(json!({}))
        }
        "DeleteCfsPGroup" => {
            inner.groups.remove(&group_id).ok_or_else(not_found)?;
            Ok(json!({}))
        }
        _ => Err(api_error("InvalidAction")),
    }
}
