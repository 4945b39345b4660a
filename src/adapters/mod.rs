// Adapters layer: concrete implementations for external systems (assistant http, widget assets, clock).

pub mod assets;
pub mod assistant;
pub mod clock;
