//! Core rate abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod median;
pub mod quote;
pub mod routing;

// Re-export main types for cleaner imports
pub use error::{FetchError, RateError, RoutingError};
pub use median::median;
pub use quote::{Quote, REFERENCE_ASSET, RateSource, SourceId};
pub use routing::{RoutingConfig, RoutingPolicy};
