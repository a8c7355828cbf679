//! Retry-wrapped API invocation shared by all resources

use crate::client::{ApiRequest, Service, TencentApi};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tcflow_cloud::{Attributes, CloudError, Context, Result, RetryError, retry, retryable};

/// Invoke `request` until it succeeds, fails permanently, or `timeout` passes
///
/// Errors whose code is listed in `not_found_codes` (or starts with
/// `ResourceNotFound`) surface as [`CloudError::ResourceNotFound`] without
/// being retried.
pub async fn call<T: DeserializeOwned>(
    ctx: &Context,
    api: &dyn TencentApi,
    request: ApiRequest,
    timeout: Duration,
    not_found_codes: &[&str],
) -> Result<T> {
    let operation = request.operation();
    let request = &request;

    retry(ctx, &operation, timeout, move || async move {
        let response = api
            .call(request.clone())
            .await
            .map_err(|e| retryable(e.into_cloud_error(not_found_codes)))?;
        serde_json::from_value(response).map_err(|e| RetryError::NonRetryable(CloudError::Json(e)))
    })
    .await
}

/// Like [`call`], mapping not-found to `None`
pub async fn call_optional<T: DeserializeOwned>(
    ctx: &Context,
    api: &dyn TencentApi,
    request: ApiRequest,
    timeout: Duration,
    not_found_codes: &[&str],
) -> Result<Option<T>> {
    match call(ctx, api, request, timeout, not_found_codes).await {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Issue a mutation whose response payload is irrelevant
pub async fn call_unit(
    ctx: &Context,
    api: &dyn TencentApi,
    request: ApiRequest,
    not_found_codes: &[&str],
) -> Result<()> {
    let _: serde_json::Value = call(ctx, api, request, ctx.write_timeout(), not_found_codes).await?;
    Ok(())
}

/// Build a request, mapping DTO serialization failures into the core error
pub fn request<T: serde::Serialize>(
    service: Service,
    action: &'static str,
    payload: &T,
) -> Result<ApiRequest> {
    service.request(action, payload).map_err(CloudError::from)
}

/// Convert a JSON object into attributes, dropping null members
pub fn to_attributes(value: serde_json::Value) -> Attributes {
    match value {
        serde_json::Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        _ => Attributes::new(),
    }
}
