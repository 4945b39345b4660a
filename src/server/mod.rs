//! HTTP surface of the widget gateway.
//!
//! `/health` and `/widget/token` are public; the widget script, stylesheet
//! and chat endpoint sit behind [`middleware::require_widget_token`].

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::assets::LocalAssets;
use crate::adapters::assistant::HttpAssistant;
use crate::adapters::clock::SystemClock;
use crate::config::AppConfig;
use crate::core::chat::ChatService;
use crate::core::gate::{AllowList, DomainGate};
use crate::core::token::TokenAuthority;
use crate::domain::ports::AssetStore;
use crate::utils::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<DomainGate>,
    pub chat: ChatService,
    pub assets: Arc<dyn AssetStore>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(gate: DomainGate, chat: ChatService, assets: Arc<dyn AssetStore>) -> Self {
        Self {
            gate: Arc::new(gate),
            chat,
            assets,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let authority = TokenAuthority::new(config.signing_secret()?, Arc::new(SystemClock));
        let allow_list = AllowList::new(config.widget.allowed_domains.iter().cloned());
        tracing::info!("✅ {} domains allowed to load the widget", allow_list.len());

        let assistant = HttpAssistant::new(
            config.assistant.endpoint.clone(),
            config.api_key().map(str::to_string),
            config.assistant_timeout(),
        )?;
        let assets = LocalAssets::new(&config.widget.script_path, &config.widget.style_path);

        Ok(Self::new(
            DomainGate::new(authority, allow_list),
            ChatService::new(Arc::new(assistant)),
            Arc::new(assets),
        ))
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(middleware::TOKEN_HEADER)])
}

pub fn router(state: SharedState) -> Router {
    let gated = Router::new()
        .route("/widget/script", get(routes::widget_script))
        .route("/widget/style.css", get(routes::widget_style))
        .route("/api/chat", post(routes::chat))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_widget_token,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route("/widget/token", get(routes::issue_token))
        .merge(gated)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Widget gateway listening on http://{}", addr);

    axum::serve(listener, router(Arc::new(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Widget gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
