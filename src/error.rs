//! Failure taxonomy for tracking queries.
//!
//! Nothing here escapes a provider's `track` method: every variant is
//! folded into a [`TrackingResult`] at the provider boundary, so callers
//! always get the envelope.

use crate::model::TrackingResult;
use thiserror::Error;

/// Everything that can go wrong between navigation and extraction.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The carrier reports no record for the queried tracking number.
    #[error("Kargo numarası bulunamadı")]
    NotFound,

    /// Navigation did not land on the expected results page.
    #[error("unexpected redirect to {0}")]
    UnexpectedNavigation(String),

    /// A required labeled field was missing from the results page.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Browser-level failure: launch, navigation, DOM access.
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

impl TrackError {
    /// Fold the error into the result envelope every caller receives.
    pub fn into_result(self) -> TrackingResult {
        let message = self.to_string();
        match self {
            TrackError::NotFound => TrackingResult::not_found(message),
            _ => TrackingResult::error(message),
        }
    }
}
