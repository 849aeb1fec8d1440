//! Wire types for the Dify chat API

use serde::{Deserialize, Serialize};

/// Raw response to a blocking `/chat-messages` call
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub answer: String,
    pub conversation_id: Option<String>,
    /// Message ID
    pub id: Option<String>,
    pub created_at: Option<i64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// One conversation variable as returned by `/conversations/{id}/variables`
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationVariable {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    pub value_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VariablesResponse {
    #[serde(default)]
    pub data: Vec<ConversationVariable>,
}

/// Result of running the document-analysis flow end to end
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub answer: String,
    /// Structured record the chatflow stores in its `confirmation_record`
    /// conversation variable, when it produced one
    pub confirmation_record: Option<serde_json::Value>,
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
    pub created_at: Option<i64>,
    pub metadata: serde_json::Value,
}

impl ConversationVariable {
    /// The variable's value, decoding JSON-typed values that Dify returns
    /// as embedded strings
    pub fn decoded_value(&self) -> serde_json::Value {
        if self.value_type.as_deref() == Some("json") {
            if let serde_json::Value::String(raw) = &self.value {
                if let Ok(parsed) = serde_json::from_str(raw) {
                    return parsed;
                }
                tracing::warn!(name = %self.name, "Failed to parse json-typed variable value");
            }
        }
        self.value.clone()
    }
}
