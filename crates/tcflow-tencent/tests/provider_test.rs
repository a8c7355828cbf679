mod common;

use common::{FakeTencent, config, fast_context};
use serde_json::json;
use tcflow_cloud::{
    ActionType, CloudProvider, Engine, GlobalState, ResourceConfig, ResourceSet, ResourceStatus,
};
use tcflow_tencent::TencentCloudProvider;

fn provider(fake: &std::sync::Arc<FakeTencent>) -> TencentCloudProvider {
    TencentCloudProvider::with_api(fake.clone(), "ap-guangzhou")
}

#[tokio::test]
async fn test_check_auth_reports_account() {
    let fake = FakeTencent::new();
    let status = provider(&fake).check_auth().await.unwrap();

    assert!(status.authenticated);
    assert!(status.account_info.unwrap().contains("100000000001"));
    assert_eq!(fake.calls(), vec!["sts:GetCallerIdentity"]);
}

#[tokio::test]
async fn test_check_auth_reports_rejected_credentials() {
    let fake = FakeTencent::new();
    fake.inject("GetCallerIdentity", "AuthFailure.SecretIdNotFound", 1);

    let status = provider(&fake).check_auth().await.unwrap();

    assert!(!status.authenticated);
    assert!(status.error.unwrap().contains("AuthFailure.SecretIdNotFound"));
}

#[test]
fn test_registered_types() {
    let fake = FakeTencent::new();
    let engine = Engine::new(&provider(&fake), fast_context());

    assert_eq!(
        engine.resource_types(),
        vec![
            "tencentcloud_cfs_access_group",
            "tencentcloud_kms_key",
            "tencentcloud_private_dns_zone",
            "tencentcloud_tdmq_namespace",
        ]
    );
    assert_eq!(
        engine.data_source_types(),
        vec!["tencentcloud_kms_keys", "tencentcloud_private_dns_zones"]
    );
}

#[tokio::test]
async fn test_plan_apply_converges() {
    let fake = FakeTencent::new();
    let engine = Engine::new(&provider(&fake), fast_context());
    let mut state = GlobalState::new();

    let mut desired = ResourceSet::new();
    desired.add(ResourceConfig::new(
        "tencentcloud_kms_key",
        "app",
        config(json!({"alias": "app"})),
    ));
    desired.add(ResourceConfig::new(
        "tencentcloud_tdmq_namespace",
        "orders",
        config(json!({"environ_name": "orders", "cluster_id": "pulsar-1", "msg_ttl": 60})),
    ));

    let plan = engine.plan(&desired, &state).unwrap();
    assert_eq!(plan.summary().create, 2);

    let result = engine.apply(&plan, &desired, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);
    assert_eq!(
        state
            .get_resource("tencentcloud_tdmq_namespace.orders")
            .unwrap()
            .id,
        "orders#pulsar-1"
    );

    let plan = engine.plan(&desired, &state).unwrap();
    assert!(plan.actions.iter().all(|a| a.action_type == ActionType::NoOp));

    // A ForceNew change becomes a replacement
    let mut moved = desired.clone();
    moved.add(ResourceConfig::new(
        "tencentcloud_tdmq_namespace",
        "orders",
        config(json!({"environ_name": "orders", "cluster_id": "pulsar-2", "msg_ttl": 60})),
    ));
    let plan = engine.plan(&moved, &state).unwrap();
    let action = plan.action_for("tencentcloud_tdmq_namespace.orders").unwrap();
    assert_eq!(action.action_type, ActionType::Replace);

    let result = engine.apply(&plan, &moved, &mut state).await;
    assert!(result.is_success(), "{:?}", result.failed);
    let replaced = state
        .get_resource("tencentcloud_tdmq_namespace.orders")
        .unwrap();
    assert_eq!(replaced.id, "orders#pulsar-2");
    assert_eq!(replaced.status, ResourceStatus::Present);
}

#[tokio::test]
async fn test_refresh_drops_resources_deleted_out_of_band() {
    let fake = FakeTencent::new();
    let engine = Engine::new(&provider(&fake), fast_context());
    let mut state = GlobalState::new();

    engine
        .import("tencentcloud_kms_key.missing", "kms-does-not-exist", &mut state)
        .await
        .unwrap_err();

    let mut desired = ResourceSet::new();
    desired.add(ResourceConfig::new(
        "tencentcloud_cfs_access_group",
        "agents",
        config(json!({"name": "agents"})),
    ));
    let plan = engine.plan(&desired, &state).unwrap();
    engine.apply(&plan, &desired, &mut state).await;

    let id = state
        .get_resource("tencentcloud_cfs_access_group.agents")
        .unwrap()
        .id
        .clone();
    fake.remove(&id);

    let removed = engine.refresh(&mut state).await.unwrap();
    assert_eq!(removed, vec!["tencentcloud_cfs_access_group.agents"]);
    assert!(state.resources.is_empty());
}
