use crate::domain::model::{AssistantReply, ChatRequest, WidgetAsset};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<AssistantReply>;
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// 檔案不存在時回傳 `None`
    async fn load(&self, asset: WidgetAsset) -> Result<Option<Vec<u8>>>;
}
