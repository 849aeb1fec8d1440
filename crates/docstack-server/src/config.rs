use crate::error::{Result, ServerError};
use std::env;
use std::path::PathBuf;

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cache_dir: PathBuf,
    pub cache_max_size_mb: u64,
    pub cache_ttl_secs: u64,
    pub rustfs_endpoint: String,
    pub rustfs_access_key: String,
    pub rustfs_secret_key: String,
    pub rustfs_bucket: String,
    pub rustfs_region: String,
    pub dify_base_url: String,
    pub dify_api_key: Option<String>,
}

impl Config {
    /// Parse configuration from environment variables.
    ///
    /// Object-store credentials are required; everything else has a
    /// development-friendly default.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let cache_dir = env::var("CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./cache/blobs"));

        let cache_max_size_mb = env::var("CACHE_MAX_SIZE_MB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(512);

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let rustfs_endpoint =
            env::var("RUSTFS_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        let rustfs_access_key = required("RUSTFS_ACCESS_KEY")?;
        let rustfs_secret_key = required("RUSTFS_SECRET_KEY")?;

        let rustfs_bucket =
            env::var("RUSTFS_BUCKET").unwrap_or_else(|_| "documents".to_string());

        // RustFS does not validate the region, but SigV4 needs one
        let rustfs_region = env::var("RUSTFS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let dify_base_url =
            env::var("DIFY_BASE_URL").unwrap_or_else(|_| "https://api.dify.ai/v1".to_string());

        let dify_api_key = env::var("DIFY_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            port,
            cache_dir,
            cache_max_size_mb,
            cache_ttl_secs,
            rustfs_endpoint,
            rustfs_access_key,
            rustfs_secret_key,
            rustfs_bucket,
            rustfs_region,
            dify_base_url,
            dify_api_key,
        })
    }

    pub fn max_cache_bytes(&self) -> u64 {
        self.cache_max_size_mb * 1024 * 1024
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServerError::Config(format!("{name} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_cache_bytes_conversion() {
        let config = Config {
            port: 8000,
            cache_dir: PathBuf::from("./cache/blobs"),
            cache_max_size_mb: 512,
            cache_ttl_secs: 3600,
            rustfs_endpoint: "http://localhost:9000".to_string(),
            rustfs_access_key: "ak".to_string(),
            rustfs_secret_key: "sk".to_string(),
            rustfs_bucket: "documents".to_string(),
            rustfs_region: "us-east-1".to_string(),
            dify_base_url: "https://api.dify.ai/v1".to_string(),
            dify_api_key: None,
        };

        assert_eq!(config.max_cache_bytes(), 512 * 1024 * 1024);
    }
}
