use serde::Deserialize;

use super::lenient;
use super::media::{Scalar, VideoInfo};

/// Outer wrapper every upstream endpoint returns.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamEnvelope<T> {
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub success: bool,
    pub result: Option<T>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub response_time: Option<Scalar>,
}

impl<T> UpstreamEnvelope<T> {
    /// The result, but only when the upstream also flagged success.
    pub fn into_result(self) -> Option<T> {
        if self.success {
            self.result
        } else {
            None
        }
    }
}

/// `result` object of the YouTube endpoint. The probe call only fills the
/// descriptive fields; a format fetch also carries `downloadUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YouTubeMedia {
    #[serde(default, deserialize_with = "lenient::text")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub duration: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub format: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
}

impl YouTubeMedia {
    pub fn probe_info(&self) -> VideoInfo {
        VideoInfo {
            title: self.title.clone(),
            duration: self.duration.clone(),
            thumbnail: self.cover.clone(),
            kind: self.kind.clone(),
            ..Default::default()
        }
    }

    pub fn download_info(&self) -> VideoInfo {
        VideoInfo {
            quality: self.quality.clone(),
            format: self.format.clone(),
            ..self.probe_info()
        }
    }
}
