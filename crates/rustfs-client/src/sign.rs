//! AWS Signature Version 4 query-string presigning
//!
//! Implements just enough of SigV4 to presign S3-style requests: path-style
//! addressing, `host` as the only signed header, and `UNSIGNED-PAYLOAD` as
//! the content hash (required for query auth, where the body is not known
//! at signing time).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// Inputs for one presigned request
pub(crate) struct SignRequest<'a> {
    pub method: &'a str,
    pub endpoint: &'a Url,
    pub bucket: &'a str,
    /// Object key; empty for bucket-level operations
    pub key: &'a str,
    pub access_key: &'a str,
    pub secret_key: &'a str,
    pub region: &'a str,
    pub expires_secs: u64,
    pub now: DateTime<Utc>,
}

/// Produce a fully presigned URL for the request
pub(crate) fn presign(req: &SignRequest<'_>) -> String {
    let amz_date = req.now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = req.now.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/s3/aws4_request", date, req.region);
    let credential = format!("{}/{}", req.access_key, scope);

    let canonical_uri = canonical_uri(req.bucket, req.key);
    let host = host_header(req.endpoint);

    // Already in canonical (alphabetical) order
    let canonical_query = format!(
        "X-Amz-Algorithm=AWS4-HMAC-SHA256\
         &X-Amz-Credential={}\
         &X-Amz-Date={}\
         &X-Amz-Expires={}\
         &X-Amz-SignedHeaders=host",
        urlencoding::encode(&credential),
        amz_date,
        req.expires_secs,
    );

    let canonical_request = format!(
        "{}\n{}\n{}\nhost:{}\n\nhost\nUNSIGNED-PAYLOAD",
        req.method, canonical_uri, canonical_query, host,
    );

    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical_request.as_bytes())),
    );

    let signature = hex::encode(hmac(
        &signing_key(req.secret_key, &date, req.region),
        string_to_sign.as_bytes(),
    ));

    format!(
        "{}://{}{}?{}&X-Amz-Signature={}",
        req.endpoint.scheme(),
        host,
        canonical_uri,
        canonical_query,
        signature,
    )
}

/// Path-style canonical URI: `/bucket` or `/bucket/encoded/key`
fn canonical_uri(bucket: &str, key: &str) -> String {
    if key.is_empty() {
        return format!("/{bucket}");
    }
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/{}/{}", bucket, encoded.join("/"))
}

/// Host with the port appended when it is not the scheme default
fn host_header(endpoint: &Url) -> String {
    let host = endpoint.host_str().unwrap_or_default();
    match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derive the SigV4 signing key: date, region, service, then request scope
fn signing_key(secret_key: &str, date: &str, region: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, b"s3");
    hmac(&k_service, b"aws4_request")
}
