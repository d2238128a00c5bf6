//! Unit-fatal error taxonomy.
//!
//! Every failure inside one extraction unit surfaces to the scheduler as a
//! single fatal unit failure: either the unit fully completes or it fails
//! as a whole. Retry is the host scheduler's decision, never this layer's.

use rowhaul_types::EncodingError;
use thiserror::Error;

use crate::extractor::ExtractorError;

/// Fatal failure of one extraction unit.
#[derive(Debug, Error)]
pub enum UnitError {
    /// The configured run role is outside the recognized set. Raised during
    /// context resolution, before the heartbeat starts.
    #[error("unsupported run role '{role}' (expected 'produce' or 'consume')")]
    UnsupportedRole { role: String },

    /// No extractor is registered under the configured logical name. Raised
    /// before the heartbeat starts.
    #[error("no extractor registered under '{name}'")]
    UnknownExtractor { name: String },

    /// The extractor call raised an error (or panicked). Wraps the original
    /// cause; the extractor is never retried at this layer.
    #[error("extraction failed")]
    Extraction(#[source] anyhow::Error),

    /// A row could not be normalized, encoded, or written. Surfaces through
    /// the extractor call boundary.
    #[error("row encoding failed")]
    Encoding(#[source] EncodingError),
}

impl UnitError {
    /// Returns `true` for failures raised before any heartbeat or extractor
    /// activity (unrecognized role, unknown extractor name).
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedRole { .. } | Self::UnknownExtractor { .. }
        )
    }
}

impl From<ExtractorError> for UnitError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::Encoding(e) => Self::Encoding(e),
            ExtractorError::Source(e) => Self::Extraction(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_flagged() {
        assert!(UnitError::UnsupportedRole {
            role: "replicate".into()
        }
        .is_configuration());
        assert!(UnitError::UnknownExtractor {
            name: "missing".into()
        }
        .is_configuration());
        assert!(!UnitError::Extraction(anyhow::anyhow!("boom")).is_configuration());
    }

    #[test]
    fn test_extraction_preserves_cause() {
        use std::error::Error as _;
        let err = UnitError::Extraction(anyhow::anyhow!("connection reset"));
        assert!(err.source().unwrap().to_string().contains("connection reset"));
    }

    #[test]
    fn test_extractor_error_conversion() {
        let enc: UnitError = ExtractorError::Encoding(EncodingError::SchemaUnbound).into();
        assert!(matches!(enc, UnitError::Encoding(_)));

        let src: UnitError = ExtractorError::Source(anyhow::anyhow!("query failed")).into();
        assert!(matches!(src, UnitError::Extraction(_)));
    }
}
