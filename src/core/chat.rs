use std::sync::Arc;

use crate::core::extractor::OfferExtractor;
use crate::domain::model::{AssistantReply, ChatReply, ChatRequest, VerifiedDomain};
use crate::domain::ports::Assistant;
use crate::utils::error::{Result, WidgetError};

pub const FALLBACK_REPLY: &str = "Sorry, I could not find an answer right now.";

#[derive(Clone)]
pub struct ChatService {
    assistant: Arc<dyn Assistant>,
    extractor: OfferExtractor,
}

impl ChatService {
    pub fn new(assistant: Arc<dyn Assistant>) -> Self {
        Self {
            assistant,
            extractor: OfferExtractor::new(),
        }
    }

    /// 轉發訪客訊息並把回覆拆成文字片段與行程卡片
    pub async fn handle(
        &self,
        domain: &VerifiedDomain,
        message: Option<&str>,
        email: Option<&str>,
    ) -> Result<ChatReply> {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| WidgetError::validation("missing message"))?;

        tracing::info!(
            "💬 Message from {} ({})",
            domain.as_str(),
            email.unwrap_or("email not provided")
        );

        let request = ChatRequest {
            message: message.to_string(),
            domain: domain.as_str().to_string(),
            email: email.map(str::to_string),
        };

        let reply = self.assistant.ask(&request).await?;
        let text = reply_text(reply);
        let layout = self.extractor.extract(&text);

        tracing::debug!(
            "Reply split into {} fragments and {} offers",
            layout.fragments.len(),
            layout.offers.len()
        );

        Ok(ChatReply {
            reply: text,
            fragments: layout.fragments,
            offers: layout.offers,
        })
    }
}

/// 陣列回覆取最後一則訊息的 content；沒有可用內容時使用固定的備用文字
pub fn reply_text(reply: AssistantReply) -> String {
    let text = match reply {
        AssistantReply::Text(text) => Some(text),
        AssistantReply::Messages(messages) => messages.into_iter().last().and_then(|m| m.content),
    };

    text.filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string())
}
