use std::time::Duration;

use thiserror::Error;

use crate::models::request::DownloadRequest;
use crate::models::response::ErrorEnvelope;
use crate::platforms::Platform;

pub const UNAVAILABLE_NOTE: &str = "Service temporarily unavailable";
pub const UNAVAILABLE_SUGGESTION: &str =
    "Please try again in a few minutes or use alternative download methods.";
pub const INTERNAL_MESSAGE: &str = "Internal server error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL and platform are required")]
    MissingFields,
    #[error("Invalid URL format")]
    InvalidUrl,
    #[error("Unsupported platform")]
    UnsupportedPlatform,
}

/// The upstream answered, but the payload holds nothing we can hand out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExtractionFailure(pub String);

impl ExtractionFailure {
    pub fn no_download_url() -> Self {
        Self("No download URL available in the response".into())
    }

    pub fn invalid_response(provider: &str) -> Self {
        Self(format!("Invalid response from {}", provider))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    #[error("upstream responded with HTTP {status}")]
    Status { status: u16, message: Option<String> },
    #[error("no response from upstream: {0}")]
    Transport(String),
    #[error("upstream call exceeded its {0:?} budget")]
    Timeout(Duration),
    #[error("unreadable upstream payload: {0}")]
    InvalidPayload(String),
    #[error("{0}")]
    Other(String),
}

impl UpstreamError {
    /// Failures with a client-facing meaning of their own. Payload problems
    /// are not among them: to the client they look like an empty result.
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            UpstreamError::Status { .. } | UpstreamError::Transport(_) | UpstreamError::Timeout(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: u16,
    pub message: String,
}

impl Classification {
    fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

pub fn classify(err: &UpstreamError) -> Classification {
    match err {
        UpstreamError::Status { status, message } => match status {
            400 => Classification::new(400, "Invalid video URL or parameters"),
            401 => Classification::new(401, "Authentication required"),
            403 => Classification::new(403, "Access denied - video may be private or restricted"),
            404 => Classification::new(404, "Video not found - it may have been deleted"),
            429 => Classification::new(429, "Too many requests - please wait before trying again"),
            503 => Classification::new(503, UNAVAILABLE_NOTE),
            other => Classification::new(
                *other,
                message.clone().unwrap_or_else(|| "API error occurred".into()),
            ),
        },
        UpstreamError::Transport(_) => {
            Classification::new(503, "Unable to reach the download service")
        }
        UpstreamError::Timeout(_) => {
            Classification::new(408, "Request timeout - video may be too large")
        }
        UpstreamError::InvalidPayload(_) | UpstreamError::Other(_) => {
            Classification::new(500, INTERNAL_MESSAGE)
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{} download service is temporarily unavailable", .platform.display_name())]
    ServiceUnavailable {
        platform: Platform,
        original_url: String,
    },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0} downloads are not yet implemented.")]
    NotImplemented(Platform),

    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    pub fn unavailable(request: &DownloadRequest) -> Self {
        RelayError::ServiceUnavailable {
            platform: request.platform,
            original_url: request.url.clone(),
        }
    }

    pub fn classification(&self) -> Classification {
        match self {
            RelayError::Validation(e) => Classification::new(400, e.to_string()),
            RelayError::ServiceUnavailable { platform, .. } => Classification::new(
                503,
                format!(
                    "{} download service is temporarily unavailable. Please try again later.",
                    platform.display_name()
                ),
            ),
            RelayError::Upstream(e) => classify(e),
            RelayError::NotImplemented(_) => Classification::new(501, self.to_string()),
            RelayError::Internal(_) => Classification::new(500, INTERNAL_MESSAGE),
        }
    }

    /// Client-facing body. Only the unavailable case carries request context.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let mut envelope = ErrorEnvelope::new(self.classification().message);
        if let RelayError::ServiceUnavailable {
            platform,
            original_url,
        } = self
        {
            envelope.platform = Some(*platform);
            envelope.original_url = Some(original_url.clone());
            envelope.note = Some(UNAVAILABLE_NOTE.into());
            envelope.suggestion = Some(UNAVAILABLE_SUGGESTION.into());
        }
        envelope
    }
}
