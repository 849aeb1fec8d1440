//! Dify chat API HTTP client

use crate::error::{DifyError, Result};
use crate::types::{AnalysisOutcome, ChatMessageResponse, VariablesResponse};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Name of the chatflow input the first-page image is bound to
const FRONT_PAGE_INPUT: &str = "front_page";

/// Conversation variable the chatflow fills with its structured record
const CONFIRMATION_VARIABLE: &str = "confirmation_record";

/// Default query sent with the document image
const DEFAULT_QUERY: &str = "Analyze this document image";

/// Client for a Dify application exposing the document-analysis chatflow
pub struct DifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl DifyClient {
    /// Create a new client. Chat answers can take a while to generate, so
    /// the request timeout is generous.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Send a blocking chat message carrying the document image by URL
    pub async fn send_document_message(
        &self,
        image_url: &str,
        user_id: &str,
        query: &str,
    ) -> Result<ChatMessageResponse> {
        let body = json!({
            "inputs": {
                FRONT_PAGE_INPUT: {
                    "type": "image",
                    "transfer_method": "remote_url",
                    "url": image_url,
                }
            },
            "query": query,
            "response_mode": "blocking",
            "user": user_id,
        });

        debug!(image_url, user_id, "Sending document to Dify");

        let response = self
            .http
            .post(format!("{}/chat-messages", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Read one conversation variable by name; `None` when the
    /// conversation does not have it
    pub async fn conversation_variable(
        &self,
        conversation_id: &str,
        name: &str,
        user_id: &str,
    ) -> Result<Option<serde_json::Value>> {
        let response = self
            .http
            .get(format!(
                "{}/conversations/{}/variables",
                self.base_url, conversation_id
            ))
            .query(&[("user", user_id)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let variables: VariablesResponse = response.json().await?;
        Ok(variables
            .data
            .into_iter()
            .find(|v| v.name == name)
            .map(|v| v.decoded_value()))
    }

    /// Run the full analysis flow: chat message, then pull the
    /// `confirmation_record` variable from the resulting conversation.
    pub async fn analyze_document(
        &self,
        image_url: &str,
        user_id: &str,
        query: Option<&str>,
    ) -> Result<AnalysisOutcome> {
        let response = self
            .send_document_message(image_url, user_id, query.unwrap_or(DEFAULT_QUERY))
            .await?;

        let confirmation_record = match response.conversation_id.as_deref() {
            Some(conversation_id) => {
                match self
                    .conversation_variable(conversation_id, CONFIRMATION_VARIABLE, user_id)
                    .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        // The answer is still useful without the variable
                        warn!(conversation_id, error = %e, "Failed to read confirmation record");
                        None
                    }
                }
            }
            None => {
                warn!("Dify response carried no conversation_id");
                None
            }
        };

        info!(
            conversation_id = response.conversation_id.as_deref().unwrap_or(""),
            has_record = confirmation_record.is_some(),
            "Dify analysis complete"
        );

        Ok(AnalysisOutcome {
            answer: response.answer,
            confirmation_record,
            conversation_id: response.conversation_id,
            message_id: response.id,
            created_at: response.created_at,
            metadata: response.metadata,
        })
    }
}

/// Turn a non-success response into an API error with a bounded body slice
async fn api_error(response: reqwest::Response) -> DifyError {
    let status = response.status().as_u16();
    let mut message = response.text().await.unwrap_or_default();
    message.truncate(512);
    DifyError::Api { status, message }
}
