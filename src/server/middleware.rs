use axum::extract::{Request, State};
use axum::http::header::ORIGIN;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::server::SharedState;
use crate::utils::error::Result;

pub const TOKEN_HEADER: &str = "x-widget-token";
pub const TOKEN_QUERY_PARAM: &str = "token";

/// 驗證 token 與 Origin，通過後把 `VerifiedDomain` 放進 request extensions
pub async fn require_widget_token(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = token_from_query(request.uri().query())
        .or_else(|| header_value(request.headers(), TOKEN_HEADER));
    let origin = header_value(request.headers(), ORIGIN.as_str());

    let verified = state.gate.admit(token.as_deref(), origin.as_deref())?;
    tracing::debug!("Widget request admitted for {}", verified.as_str());

    request.extensions_mut().insert(verified);
    Ok(next.run(request).await)
}

/// query 參數優先，其次是 `x-widget-token` header
pub fn token_from_query(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == TOKEN_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .filter(|value| !value.is_empty())
}
