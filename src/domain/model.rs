use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 簽進 token 的內容：授權網域與有效期間（Unix 秒）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetClaims {
    pub domain: String,
    pub iat: i64,
    pub exp: i64,
}

impl WidgetClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: WidgetClaims,
}

/// 驗證結果只有兩種：過期與竄改不做區分
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(WidgetClaims),
    Invalid,
}

impl TokenVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, TokenVerdict::Valid(_))
    }

    pub fn into_claims(self) -> Option<WidgetClaims> {
        match self {
            TokenVerdict::Valid(claims) => Some(claims),
            TokenVerdict::Invalid => None,
        }
    }
}

/// 通過門禁後附在請求上的網域
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDomain(pub String);

impl VerifiedDomain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseOffer {
    pub nights: String,
    pub price: String,
    pub url: String,
    pub departure: String,
    pub route_list: Vec<String>,
}

impl CruiseOffer {
    /// 至少有一個欄位才算是行程，否則視為一般敘述
    pub fn has_content(&self) -> bool {
        !self.url.is_empty()
            || !self.price.is_empty()
            || !self.nights.is_empty()
            || !self.departure.is_empty()
            || !self.route_list.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextFragment(pub String);

impl TextFragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 渲染順序固定：先全部文字片段，再全部行程卡片
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyLayout {
    pub fragments: Vec<TextFragment>,
    pub offers: Vec<CruiseOffer>,
}

impl ReplyLayout {
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(TextFragment::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// 外部 AI 服務的回覆：純文字或訊息陣列
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Text(String),
    Messages(Vec<AssistantMessage>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub fragments: Vec<TextFragment>,
    pub offers: Vec<CruiseOffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAsset {
    Script,
    Stylesheet,
}

impl WidgetAsset {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetAsset::Script => "widget build",
            WidgetAsset::Stylesheet => "widget stylesheet",
        }
    }
}
