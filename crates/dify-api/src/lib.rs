//! Rust client for the Dify chat API
//!
//! Drives the document-analysis chatflow: send a document image by URL as
//! the `front_page` input of a blocking chat message, then read the
//! `confirmation_record` conversation variable the flow populates.
//!
//! # Example
//!
//! ```no_run
//! use dify_api::DifyClient;
//!
//! # async fn example() -> Result<(), dify_api::DifyError> {
//! let client = DifyClient::new("https://api.dify.ai/v1", "app-key");
//!
//! let outcome = client
//!     .analyze_document("https://storage.example.com/doc1/first_page.png", "user-1", None)
//!     .await?;
//! println!("{}", outcome.answer);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::DifyClient;
pub use error::{DifyError, Result};
pub use types::{AnalysisOutcome, ChatMessageResponse, ConversationVariable};
