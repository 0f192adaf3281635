//! Error types shared by the catalog, sampler and extraction session.

use thiserror::Error;

/// Errors produced by palette operations.
///
/// Every variant is recoverable: a failed operation yields no result and
/// leaves the catalog as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    /// A hex color string was not `#RRGGBB`
    #[error("invalid hex color '{input}': {reason}")]
    InvalidFormat {
        /// The rejected input
        input: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// A pixel read was requested before an image surface was ready
    #[error("image surface unavailable: {reason}")]
    SurfaceUnavailable {
        /// Why the surface could not be read
        reason: String,
    },

    /// The aesthetic-analysis call failed or returned schema-invalid data
    #[error("aesthetic analysis failed: {message}")]
    ExternalServiceFailure {
        /// Description of the failure
        message: String,
    },

    /// An appended entry reused an id already present in the catalog
    #[error("duplicate catalog id: {id}")]
    DuplicateIdentifier {
        /// The colliding id
        id: String,
    },

    /// An extraction is already in flight
    #[error("an extraction is already in progress")]
    Busy,

    /// A response arrived for an image that has since been replaced
    #[error("extraction result discarded: image was replaced while the request was in flight")]
    StaleSession,
}

impl PaletteError {
    pub(crate) fn invalid_format(input: &str, reason: &'static str) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn surface_unavailable(reason: impl Into<String>) -> Self {
        Self::SurfaceUnavailable {
            reason: reason.into(),
        }
    }

    pub(crate) fn service_failure(message: impl Into<String>) -> Self {
        Self::ExternalServiceFailure {
            message: message.into(),
        }
    }
}
