use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Fixed placeholder text sent in place of free text when submitting
/// the parameter form.
pub const PARAMS_MESSAGE: &str = "Providing parameters";

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
}

impl ChatRequest {
    /// A free-text message: `{ "message": "..." }`.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            params: None,
        }
    }

    /// A parameter submission: `{ "message": "Providing parameters", "params": {...} }`.
    pub fn params(params: BTreeMap<String, String>) -> Self {
        Self {
            message: PARAMS_MESSAGE.to_string(),
            params: Some(params),
        }
    }
}

/// Server response for a single exchange. Missing or null fields fall
/// back to empty/false so a sparse reply still renders instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub ask_params: bool,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One POST per call; no timeout, no retry.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "chat request failed with status: {}",
                response.status()
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_omits_params() {
        let request = ChatRequest::text("track my order");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "track my order" }));
    }

    #[test]
    fn test_params_request_uses_placeholder_message() {
        let mut params = BTreeMap::new();
        params.insert("report_name".to_string(), "Packslip".to_string());
        params.insert("country_query".to_string(), String::new());

        let request = ChatRequest::params(params);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "message": "Providing parameters",
                "params": { "report_name": "Packslip", "country_query": "" }
            })
        );
    }

    #[test]
    fn test_response_full_shape() {
        let response: ChatResponse = serde_json::from_str(
            r#"{
                "reply": "Which report?",
                "ask_params": true,
                "required": ["report_name"],
                "optional": ["country_query"]
            }"#,
        )
        .unwrap();

        assert_eq!(response.reply.as_deref(), Some("Which report?"));
        assert!(response.ask_params);
        assert_eq!(response.required, vec!["report_name"]);
        assert_eq!(response.optional, vec!["country_query"]);
    }

    #[test]
    fn test_response_missing_fields_default() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.reply.is_none());
        assert!(!response.ask_params);
        assert!(response.required.is_empty());
        assert!(response.optional.is_empty());
    }

    #[test]
    fn test_response_null_reply_tolerated() {
        let response: ChatResponse =
            serde_json::from_str(r#"{ "reply": null, "ask_params": false }"#).unwrap();
        assert!(response.reply.is_none());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = ChatClient::new("http://localhost:5000/");
        assert_eq!(client.endpoint(), "http://localhost:5000/chat");
    }
}
