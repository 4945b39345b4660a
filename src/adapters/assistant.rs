use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::domain::model::{AssistantMessage, AssistantReply, ChatRequest};
use crate::domain::ports::Assistant;
use crate::utils::error::{Result, WidgetError};

/// 透過 HTTP 轉發訊息給外部 AI 服務
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAssistant {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl Assistant for HttpAssistant {
    async fn ask(&self, request: &ChatRequest) -> Result<AssistantReply> {
        tracing::debug!("Forwarding message from {} to {}", request.domain, self.endpoint);

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("Assistant response status: {}", status);

        if !status.is_success() {
            return Err(WidgetError::upstream(format!(
                "assistant returned HTTP {}",
                status
            )));
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// 支援的回覆格式：JSON 字串、`{"reply": ...}`、訊息陣列、`{"messages": [...]}`、純文字
pub fn parse_reply(body: &str) -> Result<AssistantReply> {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        // 非 JSON 一律當純文字；空 body 之後會走 fallback 回覆
        Err(_) => return Ok(AssistantReply::Text(body.to_string())),
    };

    match value {
        Value::String(text) => Ok(AssistantReply::Text(text)),
        Value::Array(items) => Ok(AssistantReply::Messages(messages_from(items))),
        Value::Object(mut object) => match (object.remove("reply"), object.remove("messages")) {
            (Some(Value::String(text)), _) => Ok(AssistantReply::Text(text)),
            (_, Some(Value::Array(items))) => Ok(AssistantReply::Messages(messages_from(items))),
            _ => Err(WidgetError::upstream(
                "assistant response has neither `reply` nor `messages`",
            )),
        },
        other => Err(WidgetError::upstream(format!(
            "unexpected assistant response: {}",
            other
        ))),
    }
}

fn messages_from(items: Vec<Value>) -> Vec<AssistantMessage> {
    items
        .into_iter()
        .map(|item| AssistantMessage {
            role: item.get("role").and_then(Value::as_str).map(str::to_string),
            content: item.get("content").and_then(Value::as_str).map(str::to_string),
        })
        .collect()
}
