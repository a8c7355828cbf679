mod common;

use common::{FakeTencent, assert_reflects_config, config, fast_context};
use serde_json::json;
use tcflow_cloud::{CloudError, Lifecycle};
use tcflow_tencent::resources::KmsKey;

#[tokio::test]
async fn test_create_then_read_reflects_config() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let desired = config(json!({
        "alias": "app-secrets",
        "description": "application secrets",
        "key_rotation_enabled": true,
        "is_enabled": false
    }));
    let state = lifecycle.create(&desired).await.unwrap();

    assert_reflects_config(&key, &desired, &state);
    assert_eq!(state.attributes["key_state"], "Disabled");
    assert_eq!(fake.key_state(&state.id).as_deref(), Some("Disabled"));
}

#[tokio::test]
async fn test_archived_key_keeps_enabled_flag() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let desired = config(json!({"alias": "cold", "is_archived": true}));
    let state = lifecycle.create(&desired).await.unwrap();

    assert_reflects_config(&key, &desired, &state);
    assert_eq!(state.attributes["key_state"], "Archived");
}

#[tokio::test]
async fn test_import_reproduces_created_state() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let created = lifecycle
        .create(&config(json!({"alias": "imported", "description": "d"})))
        .await
        .unwrap();
    let imported = lifecycle.import(&created.id).await.unwrap();

    assert_eq!(imported.id, created.id);
    assert_eq!(imported.attributes, created.attributes);
}

#[tokio::test]
async fn test_update_alias_in_place() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let prior = lifecycle
        .create(&config(json!({"alias": "before"})))
        .await
        .unwrap();
    fake.clear_calls();

    let next = lifecycle
        .update(&prior, &config(json!({"alias": "after"})))
        .await
        .unwrap();

    assert_eq!(next.id, prior.id);
    assert_eq!(next.attributes["alias"], "after");
    assert_eq!(fake.calls(), vec!["kms:UpdateAlias", "kms:DescribeKey"]);
}

#[tokio::test]
async fn test_update_toggles_enabled_and_rotation() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let prior = lifecycle
        .create(&config(json!({"alias": "k"})))
        .await
        .unwrap();

    let desired = config(json!({
        "alias": "k",
        "is_enabled": false,
        "key_rotation_enabled": true
    }));
    let next = lifecycle.update(&prior, &desired).await.unwrap();

    assert_reflects_config(&key, &desired, &next);
    assert_eq!(fake.key_state(&prior.id).as_deref(), Some("Disabled"));
}

#[tokio::test]
async fn test_unarchive_restores_enabled_key() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let prior = lifecycle
        .create(&config(json!({"alias": "k", "is_archived": true})))
        .await
        .unwrap();
    fake.clear_calls();

    let next = lifecycle
        .update(&prior, &config(json!({"alias": "k"})))
        .await
        .unwrap();

    assert_eq!(next.attributes["is_archived"], false);
    assert_eq!(next.attributes["is_enabled"], true);
    assert_eq!(fake.calls(), vec!["kms:CancelKeyArchive", "kms:DescribeKey"]);
}

#[tokio::test]
async fn test_changing_key_usage_fails_before_any_call() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let prior = lifecycle
        .create(&config(json!({"alias": "k"})))
        .await
        .unwrap();
    fake.clear_calls();

    let err = lifecycle
        .update(
            &prior,
            &config(json!({"alias": "k", "key_usage": "ASYMMETRIC_DECRYPT_RSA_2048"})),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::ImmutableField { ref field, .. } if field == "key_usage"));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_delete_schedules_deletion_and_is_idempotent() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();
    let lifecycle = Lifecycle::new(&key, &ctx);

    let state = lifecycle
        .create(&config(json!({"alias": "doomed"})))
        .await
        .unwrap();

    lifecycle.delete(&state.id).await.unwrap();
    assert_eq!(fake.key_state(&state.id).as_deref(), Some("PendingDelete"));
    assert!(lifecycle.read(&state.id, None).await.unwrap().is_none());

    lifecycle.delete(&state.id).await.unwrap();

    fake.remove(&state.id);
    lifecycle.delete(&state.id).await.unwrap();
}

#[tokio::test]
async fn test_create_retries_rate_limit() {
    let fake = FakeTencent::new();
    fake.inject("CreateKey", "RequestLimitExceeded", 2);
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();

    let state = Lifecycle::new(&key, &ctx)
        .create(&config(json!({"alias": "busy"})))
        .await
        .unwrap();

    assert!(!state.id.is_empty());
    let creates = fake
        .calls()
        .iter()
        .filter(|c| c.as_str() == "kms:CreateKey")
        .count();
    assert_eq!(creates, 3);
}

#[tokio::test]
async fn test_create_stops_on_invalid_parameter() {
    let fake = FakeTencent::new();
    fake.inject("CreateKey", "InvalidParameterValue.AliasAlreadyExists", 1);
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();

    let err = Lifecycle::new(&key, &ctx)
        .create(&config(json!({"alias": "dup"})))
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::ApiError(_)));
    assert_eq!(fake.calls(), vec!["kms:CreateKey"]);
}

#[tokio::test]
async fn test_validation_rejects_computed_field() {
    let fake = FakeTencent::new();
    let key = KmsKey::new(fake.clone());
    let ctx = fast_context();

    let err = Lifecycle::new(&key, &ctx)
        .create(&config(json!({"alias": "k", "key_state": "Enabled"})))
        .await
        .unwrap_err();

    assert!(matches!(err, CloudError::InvalidConfig(_)));
    assert!(fake.calls().is_empty());
}
