pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliArgs;

pub use crate::config::AppConfig;
pub use crate::core::{
    chat::ChatService,
    extractor::OfferExtractor,
    gate::{AllowList, DomainGate},
    token::{SigningSecret, TokenAuthority},
};
pub use crate::domain::model::{CruiseOffer, ReplyLayout, TextFragment, TokenVerdict, VerifiedDomain};
pub use crate::server::{router, AppState};
pub use crate::utils::error::{Rejection, Result, WidgetError};
