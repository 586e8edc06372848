use serde::Serialize;

use super::media::{FormatOption, FormatSummary, Scalar, VideoInfo, YOUTUBE_FORMATS};
use crate::platforms::Platform;

pub const FORMAT_SELECTION_NOTE: &str = "Select your preferred format and quality:";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub success: bool,
    pub download_url: String,
    pub platform: Platform,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_format: Option<String>,
    pub video_info: VideoInfo,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<Scalar>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSelection {
    pub success: bool,
    pub requires_format_selection: bool,
    pub platform: Platform,
    pub original_url: String,
    pub video_info: VideoInfo,
    pub available_formats: Vec<FormatOption>,
    pub note: String,
}

impl FormatSelection {
    pub fn new(platform: Platform, original_url: &str, video_info: VideoInfo) -> Self {
        Self {
            success: true,
            requires_format_selection: true,
            platform,
            original_url: original_url.to_string(),
            video_info,
            available_formats: YOUTUBE_FORMATS.to_vec(),
            note: FORMAT_SELECTION_NOTE.to_string(),
        }
    }
}

/// Successful answer to `POST /download`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelayResponse {
    Download(DownloadResult),
    FormatSelection(FormatSelection),
}

impl From<DownloadResult> for RelayResponse {
    fn from(value: DownloadResult) -> Self {
        RelayResponse::Download(value)
    }
}

impl From<FormatSelection> for RelayResponse {
    fn from(value: FormatSelection) -> Self {
        RelayResponse::FormatSelection(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            platform: None,
            original_url: None,
            note: None,
            suggestion: None,
        }
    }
}

/// Upstream services in wire order: YouTube first.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    #[serde(rename = "nekolabs-youtube")]
    pub youtube: &'static str,
    #[serde(rename = "nekolabs-aio")]
    pub aio: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64,
    pub services: ServiceStatus,
    pub supported_platforms: Vec<&'static str>,
}

impl HealthReport {
    pub fn new(timestamp: String, uptime: f64) -> Self {
        Self {
            status: "ok",
            timestamp,
            uptime,
            services: ServiceStatus {
                youtube: "active",
                aio: "active",
            },
            supported_platforms: Platform::supported_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStatus {
    pub name: &'static str,
    pub status: &'static str,
    pub provider: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportedFormats {
    pub youtube: Vec<FormatSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Endpoints {
    pub download: &'static str,
    pub health: &'static str,
    pub info: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    pub version: &'static str,
    pub supported_platforms: Vec<PlatformStatus>,
    pub supported_formats: SupportedFormats,
    pub endpoints: Endpoints,
}

impl ApiInfo {
    pub fn new(version: &'static str) -> Self {
        let supported_platforms = Platform::ALL
            .iter()
            .map(|p| PlatformStatus {
                name: p.as_str(),
                status: "active",
                provider: if p.uses_aio() {
                    "NekoLabs AIO API"
                } else {
                    "NekoLabs YouTube API + fallback"
                },
            })
            .collect();

        Self {
            version,
            supported_platforms,
            supported_formats: SupportedFormats {
                youtube: YOUTUBE_FORMATS.iter().map(FormatOption::summary).collect(),
            },
            endpoints: Endpoints {
                download: "POST /download",
                health: "GET /health",
                info: "GET /api/info",
            },
        }
    }
}
