use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Anything the upstream does not explicitly call audio is treated as video.
    pub fn from_upstream(kind: Option<&str>) -> Self {
        match kind {
            Some("audio") => MediaKind::Audio,
            _ => MediaKind::Video,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
        }
    }
}

/// A metadata value the upstream may send as either a number or text, passed
/// through to the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Number(n) if !lenient::is_zero(&n) => Some(Scalar::Number(n)),
            Value::String(s) if !s.is_empty() => Some(Scalar::Text(s)),
            _ => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Scalar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOption {
    pub format: &'static str,
    pub quality: &'static str,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub description: &'static str,
    pub file_type: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    pub summary: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatSummary {
    pub format: &'static str,
    pub description: &'static str,
}

impl FormatOption {
    pub fn summary(&self) -> FormatSummary {
        FormatSummary {
            format: self.format,
            description: self.summary,
        }
    }
}

/// Probe format used to fetch YouTube metadata before the user picks a format.
pub const YOUTUBE_PROBE_FORMAT: &str = "480";

/// Format used when a fetch is requested without an explicit format.
pub const YOUTUBE_DEFAULT_FORMAT: &str = "480";

/// The YouTube format menu. It is a fixed list offered for every video; it is
/// not checked against what the upstream can actually produce for a given
/// video, so a short clip still lists 1080p.
pub const YOUTUBE_FORMATS: [FormatOption; 7] = [
    FormatOption {
        format: "mp3",
        quality: "128kbps",
        kind: MediaKind::Audio,
        description: "MP3 Audio (128kbps)",
        file_type: "mp3",
        icon: "🎵",
        summary: "MP3 Audio (128kbps)",
    },
    FormatOption {
        format: "144",
        quality: "144p",
        kind: MediaKind::Video,
        description: "MP4 Video (144p - Low)",
        file_type: "mp4",
        icon: "📱",
        summary: "MP4 Video (144p)",
    },
    FormatOption {
        format: "240",
        quality: "240p",
        kind: MediaKind::Video,
        description: "MP4 Video (240p - Low)",
        file_type: "mp4",
        icon: "📱",
        summary: "MP4 Video (240p)",
    },
    FormatOption {
        format: "360",
        quality: "360p",
        kind: MediaKind::Video,
        description: "MP4 Video (360p - Medium)",
        file_type: "mp4",
        icon: "💻",
        summary: "MP4 Video (360p)",
    },
    FormatOption {
        format: "480",
        quality: "480p",
        kind: MediaKind::Video,
        description: "MP4 Video (480p - Medium)",
        file_type: "mp4",
        icon: "💻",
        summary: "MP4 Video (480p)",
    },
    FormatOption {
        format: "720",
        quality: "720p",
        kind: MediaKind::Video,
        description: "MP4 Video (720p - HD)",
        file_type: "mp4",
        icon: "🖥️",
        summary: "MP4 Video (720p)",
    },
    FormatOption {
        format: "1080",
        quality: "1080p",
        kind: MediaKind::Video,
        description: "MP4 Video (1080p - Full HD)",
        file_type: "mp4",
        icon: "🖥️",
        summary: "MP4 Video (1080p)",
    },
];
