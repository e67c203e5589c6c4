//! Support chatbot proxy: forwards a user message to an OpenAI-compatible
//! chat-completions endpoint using the stored API key.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SupportChatConfig;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("support chat is not configured")]
    NotConfigured,
    #[error("upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },
    #[error("upstream returned no reply")]
    EmptyReply,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub fn build_request(config: &SupportChatConfig, message: &str) -> Result<ChatCompletionRequest, ChatError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let mut messages = Vec::with_capacity(2);
    if !config.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: config.system_prompt.clone(),
        });
    }
    messages.push(ChatMessage {
        role: "user".to_string(),
        content: message.to_string(),
    });

    Ok(ChatCompletionRequest {
        model: config.model.clone(),
        messages,
        max_tokens: config.max_tokens,
    })
}

/// Pulls the assistant text out of a chat-completions response body.
pub fn extract_reply(body: &str) -> Result<String, ChatError> {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|_| ChatError::EmptyReply)?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ChatError::EmptyReply)
}

pub struct SupportChat {
    client: Client,
    config: SupportChatConfig,
}

impl SupportChat {
    pub fn new(client: Client, config: SupportChatConfig) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().map_or(false, |key| !key.is_empty())
    }

    pub async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let request = build_request(&self.config, message)?;
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => return Err(ChatError::NotConfigured),
        };

        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));
        tracing::debug!(%url, model = %request.model, "Forwarding support chat message");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, "Support chat upstream failed");
            return Err(ChatError::Upstream { status, message: body });
        }

        extract_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> SupportChatConfig {
        SupportChatConfig {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: Some("sk-test-key".to_string()),
            model: "gpt-4o-mini".to_string(),
            system_prompt: "Você é o assistente do FluxoAzul.".to_string(),
            max_tokens: Some(300),
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_build_request() {
        let request = build_request(&create_test_config(), "  Como cadastro um boleto?  ").unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "Como cadastro um boleto?");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_build_request_rejects_blank_message() {
        assert!(matches!(build_request(&create_test_config(), "   "), Err(ChatError::EmptyMessage)));
    }

    #[test]
    fn test_extract_reply() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":" Use o menu Transações. "}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "Use o menu Transações.");
        assert!(matches!(extract_reply(r#"{"choices":[]}"#), Err(ChatError::EmptyReply)));
        assert!(matches!(extract_reply("not json"), Err(ChatError::EmptyReply)));
    }

    #[tokio::test]
    async fn test_reply_without_key_is_not_configured() {
        let mut config = create_test_config();
        config.api_key = None;
        let chat = SupportChat::new(Client::new(), config);
        assert!(!chat.is_configured());
        assert!(matches!(chat.reply("Olá").await, Err(ChatError::NotConfigured)));
    }
}
