//! Input validation, alignment, and the provider seam.

pub mod align;
pub mod provider;
pub mod validate;

pub use align::{align_and_featurize, Alignment, InsufficientData, InsufficientReason};
pub use provider::{DataError, PriceProvider, SentimentProvider};
pub use validate::{validate_scores, validate_series, DatedPoint};
