//! Widget HTTP handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{ChatReply, VerifiedDomain, WidgetAsset};
use crate::server::SharedState;
use crate::utils::error::{Result, WidgetError};

const STYLESHEET_FALLBACK: &str = "/* CSS not found */";

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub domain: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub domain: String,
    pub expires_at: DateTime<Utc>,
}

/// GET /widget/token?domain=
pub async fn issue_token(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<TokenResponse>> {
    let issued = state.gate.issue(query.domain.as_deref())?;

    Ok(Json(TokenResponse {
        expires_at: issued.claims.expires_at(),
        domain: issued.claims.domain,
        token: issued.token,
    }))
}

/// GET /widget/script?token=
pub async fn widget_script(
    State(state): State<SharedState>,
    Extension(domain): Extension<VerifiedDomain>,
) -> Result<Response> {
    let script = state
        .assets
        .load(WidgetAsset::Script)
        .await?
        .ok_or_else(|| WidgetError::AssetMissing {
            asset: WidgetAsset::Script.name().to_string(),
        })?;

    tracing::debug!("Serving widget script to {}", domain.as_str());
    Ok(([(CONTENT_TYPE, "application/javascript")], script).into_response())
}

/// GET /widget/style.css?token=
pub async fn widget_style(State(state): State<SharedState>) -> Result<Response> {
    let css = state
        .assets
        .load(WidgetAsset::Stylesheet)
        .await?
        .unwrap_or_else(|| STYLESHEET_FALLBACK.as_bytes().to_vec());

    Ok(([(CONTENT_TYPE, "text/css")], css).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/chat
pub async fn chat(
    State(state): State<SharedState>,
    Extension(domain): Extension<VerifiedDomain>,
    payload: std::result::Result<Json<ChatPayload>, JsonRejection>,
) -> Result<Json<ChatReply>> {
    // 格式錯誤的 body 也回同樣的 {"reason": ...}
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!("Rejected chat payload: {}", rejection.body_text());
        WidgetError::validation("invalid chat payload")
    })?;

    let reply = state
        .chat
        .handle(&domain, payload.message.as_deref(), payload.email.as_deref())
        .await?;

    Ok(Json(reply))
}
