pub mod chat;
pub mod extractor;
pub mod gate;
pub mod token;

pub use crate::domain::model::{CruiseOffer, ReplyLayout, TextFragment, TokenVerdict};
pub use crate::domain::ports::{AssetStore, Assistant, Clock};
pub use crate::utils::error::Result;
