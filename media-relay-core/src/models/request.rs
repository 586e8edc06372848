use serde::Deserialize;

use super::lenient;
use super::media::YOUTUBE_DEFAULT_FORMAT;
use crate::core::error::ValidationError;
use crate::platforms::Platform;

/// Body of `POST /download` before validation. Every field is optional and
/// empty strings count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDownloadRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quality: Option<String>,
}

impl RawDownloadRequest {
    /// A body that is not a JSON object decodes to an empty request, which
    /// then fails validation as missing fields.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub platform: Platform,
    pub format: Option<String>,
    pub quality: Option<String>,
}

impl DownloadRequest {
    /// True when the client has not picked a format yet.
    pub fn needs_format_selection(&self) -> bool {
        self.format.is_none() && self.quality.is_none()
    }

    pub fn selected_format(&self) -> &str {
        self.format
            .as_deref()
            .or(self.quality.as_deref())
            .unwrap_or(YOUTUBE_DEFAULT_FORMAT)
    }
}

impl TryFrom<RawDownloadRequest> for DownloadRequest {
    type Error = ValidationError;

    fn try_from(raw: RawDownloadRequest) -> Result<Self, Self::Error> {
        let (url, platform) = match (raw.url, raw.platform) {
            (Some(url), Some(platform)) => (url, platform),
            _ => return Err(ValidationError::MissingFields),
        };

        if url::Url::parse(&url).is_err() {
            return Err(ValidationError::InvalidUrl);
        }

        let platform = platform
            .parse::<Platform>()
            .map_err(|_| ValidationError::UnsupportedPlatform)?;

        Ok(Self {
            url,
            platform,
            format: raw.format,
            quality: raw.quality,
        })
    }
}
