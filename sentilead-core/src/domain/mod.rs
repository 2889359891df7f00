//! Domain types for SentiLead

pub mod feature;
pub mod price;
pub mod sentiment;
pub mod window;

pub use feature::{FeatureRow, FeatureTable};
pub use price::{is_usable_price, PricePoint};
pub use sentiment::{aggregate_daily, Aggregation, SentimentObservation, SentimentPoint};
pub use window::DateWindow;

/// Ticker type alias
pub type Ticker = String;
