//! RustFS object storage client

use crate::error::{Result, RustFsError};
use crate::sign::{presign, SignRequest};
use chrono::Utc;
use reqwest::header;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Lifetime of the presigned URLs backing internal requests. Public preview
/// URLs take their lifetime from the caller instead.
const INTERNAL_URL_TTL_SECS: u64 = 300;

/// Client for an S3-compatible object store (RustFS), using path-style
/// addressing and presigned requests throughout.
pub struct RustFsClient {
    http: reqwest::Client,
    endpoint: Url,
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
}

impl RustFsClient {
    /// Create a new client for `bucket` at `endpoint`.
    pub fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        region: &str,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| RustFsError::Config(format!("invalid endpoint URL: {e}")))?;
        if endpoint.host_str().is_none() {
            return Err(RustFsError::Config(
                "endpoint URL has no host".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            http,
            endpoint,
            bucket: bucket.to_string(),
            region: region.to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    /// Presign a request against this client's bucket
    fn sign(&self, method: &str, key: &str, expires_secs: u64) -> String {
        presign(&SignRequest {
            method,
            endpoint: &self.endpoint,
            bucket: &self.bucket,
            key,
            access_key: &self.access_key,
            secret_key: &self.secret_key,
            region: &self.region,
            expires_secs,
            now: Utc::now(),
        })
    }

    /// Presigned GET URL for sharing an object with an external consumer
    pub fn presigned_get_url(&self, key: &str, expires_secs: u64) -> String {
        self.sign("GET", key, expires_secs)
    }

    /// Create the bucket if it does not exist yet
    pub async fn ensure_bucket(&self) -> Result<()> {
        let head = self.sign("HEAD", "", INTERNAL_URL_TTL_SECS);
        let response = self.http.head(&head).send().await?;

        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(api_error(response).await);
        }

        let put = self.sign("PUT", "", INTERNAL_URL_TTL_SECS);
        let response = self.http.put(&put).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        info!(bucket = %self.bucket, "Created bucket");
        Ok(())
    }

    /// Upload an object
    pub async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let url = self.sign("PUT", key, INTERNAL_URL_TTL_SECS);
        let response = self
            .http
            .put(&url)
            .header(header::CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        debug!(key, size = data.len(), content_type, "Uploaded object");
        Ok(())
    }

    /// Download an object; `None` when the store does not have it
    pub async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let url = self.sign("GET", key, INTERNAL_URL_TTL_SECS);
        let response = self.http.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(key, "Object not found");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let data = response.bytes().await?.to_vec();
        debug!(key, size = data.len(), "Downloaded object");
        Ok(Some(data))
    }

    /// Check whether an object exists
    pub async fn object_exists(&self, key: &str) -> Result<bool> {
        let url = self.sign("HEAD", key, INTERNAL_URL_TTL_SECS);
        let response = self.http.head(&url).send().await?;

        if response.status().is_success() {
            return Ok(true);
        }
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Err(api_error(response).await)
    }
}

/// Turn a non-success response into an API error, keeping a bounded slice
/// of the body for context
async fn api_error(response: reqwest::Response) -> RustFsError {
    let status = response.status().as_u16();
    let mut message = response.text().await.unwrap_or_default();
    message.truncate(512);
    RustFsError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> RustFsClient {
        RustFsClient::new(
            "http://localhost:9000",
            "access-key",
            "secret-key",
            "documents",
            "us-east-1",
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        let result = RustFsClient::new("not a url", "ak", "sk", "documents", "us-east-1");
        assert!(matches!(result, Err(RustFsError::Config(_))));
    }

    #[test]
    fn test_presigned_get_url_targets_bucket_and_key() {
        let client = test_client();
        let url = client.presigned_get_url("doc1/first_page.png", 3600);

        assert!(url.starts_with("http://localhost:9000/documents/doc1/first_page.png?"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_get_object_unreachable_store_is_http_error() {
        // Nothing listens on this port; the transport error must surface
        // as Http, not panic or hang (30s client timeout bounds it).
        let client = RustFsClient::new(
            "http://127.0.0.1:1",
            "ak",
            "sk",
            "documents",
            "us-east-1",
        )
        .unwrap();

        let result = client.get_object("doc1/original.pdf").await;
        assert!(matches!(result, Err(RustFsError::Http(_))));
    }
}
