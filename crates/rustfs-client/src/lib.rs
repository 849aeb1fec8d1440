//! Minimal S3-compatible client for RustFS object storage
//!
//! Covers the handful of operations the document backend needs: object
//! get/put, existence checks, bucket bootstrap, and presigned GET URLs.
//! Every request is authenticated by presigning it (SigV4 query-string
//! auth with an unsigned payload), so the same signer backs both internal
//! calls and the public preview URLs.
//!
//! # Example
//!
//! ```no_run
//! use rustfs_client::RustFsClient;
//!
//! # async fn example() -> Result<(), rustfs_client::RustFsError> {
//! let client = RustFsClient::new(
//!     "http://localhost:9000",
//!     "access-key",
//!     "secret-key",
//!     "documents",
//!     "us-east-1",
//! )?;
//!
//! client.ensure_bucket().await?;
//! client.put_object("doc1/original.pdf", b"%PDF-1.4", "application/pdf").await?;
//! let url = client.presigned_get_url("doc1/original.pdf", 3600);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod sign;

pub use client::RustFsClient;
pub use error::{Result, RustFsError};
