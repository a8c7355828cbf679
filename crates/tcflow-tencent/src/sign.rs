//! TC3-HMAC-SHA256 request signing

use crate::config::Credential;
use crate::error::{Result, TencentError};
use chrono::DateTime;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

pub const ALGORITHM: &str = "TC3-HMAC-SHA256";
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(key: &[u8], data: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| TencentError::InvalidConfig(format!("invalid signing key: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// Build the `Authorization` header value for a POST of `payload`
pub fn authorization(
    credential: &Credential,
    service: &str,
    host: &str,
    timestamp: i64,
    payload: &str,
) -> Result<String> {
    let date = DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| TencentError::InvalidConfig(format!("invalid timestamp {}", timestamp)))?
        .format("%Y-%m-%d")
        .to_string();

    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        CONTENT_TYPE,
        host,
        SIGNED_HEADERS,
        sha256_hex(payload)
    );

    let scope = format!("{}/{}/tc3_request", date, service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        timestamp,
        scope,
        sha256_hex(&canonical_request)
    );

    let secret_date = hmac_sha256(format!("TC3{}", credential.secret_key).as_bytes(), &date)?;
    let secret_service = hmac_sha256(&secret_date, service)?;
    let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credential.secret_id, scope, SIGNED_HEADERS, signature
    ))
}
