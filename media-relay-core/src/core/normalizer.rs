//! Turns an all-in-one upstream payload into a download URL plus metadata.
//!
//! The upstream answers in one of three shapes depending on the platform and on
//! which of its own scrapers handled the link. [`AioPayload`] decodes them as a
//! tagged union whose variants are tried in declaration order, so a payload that
//! would satisfy several shapes always resolves to the first one.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::core::error::ExtractionFailure;
use crate::models::lenient;
use crate::models::media::{Scalar, VideoInfo};
use crate::platforms::Platform;

const DEFAULT_TITLE: &str = "Social Media Content";
const DEFAULT_LEGACY_TITLE: &str = "TikTok Video";
const DEFAULT_AUTHOR: &str = "Unknown";
const DEFAULT_DURATION: &str = "Unknown";
const DEFAULT_KIND: &str = "video";
const DEFAULT_QUALITY: &str = "original";

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMedia {
    pub download_url: String,
    pub video_info: VideoInfo,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AioPayload {
    MediaList(MediaListPayload),
    Single(SinglePayload),
    Legacy(LegacyPayload),
}

/// Carousel-style result: a non-empty `medias` list.
#[derive(Debug, Deserialize)]
pub struct MediaListPayload {
    #[serde(deserialize_with = "non_empty_medias")]
    pub medias: Vec<MediaItem>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::scalar")]
    pub duration: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub extension: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub thumbnail: Option<String>,
}

/// A single media file addressed by `url`.
#[derive(Debug, Deserialize)]
pub struct SinglePayload {
    #[serde(deserialize_with = "lenient::required_text")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub caption: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quality: Option<String>,
}

/// Older TikTok scraper output keyed by `video_url`.
#[derive(Debug, Deserialize)]
pub struct LegacyPayload {
    #[serde(deserialize_with = "lenient::required_text")]
    pub video_url: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
}

/// Items that are not objects decode as empty entries rather than rejecting the
/// list, so the first entry is still the one selected.
fn non_empty_medias<'de, D>(deserializer: D) -> Result<Vec<MediaItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    if raw.is_empty() {
        return Err(D::Error::custom("medias is empty"));
    }
    Ok(raw
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .collect())
}

impl AioPayload {
    pub fn decode(raw: Value) -> Option<Self> {
        serde_json::from_value(raw).ok()
    }

    pub fn shape(&self) -> &'static str {
        match self {
            AioPayload::MediaList(_) => "medias",
            AioPayload::Single(_) => "url",
            AioPayload::Legacy(_) => "video_url",
        }
    }

    pub fn into_media(self) -> Result<NormalizedMedia, ExtractionFailure> {
        match self {
            AioPayload::MediaList(p) => {
                let author = or_default(p.author.or(p.username), DEFAULT_AUTHOR);
                let title = or_default(p.title.or(p.caption), DEFAULT_TITLE);
                let duration = p.duration.unwrap_or_else(|| Scalar::from(DEFAULT_DURATION));

                // Position decides, not quality: the first entry is what the
                // upstream considers the primary media of the post.
                let first = p
                    .medias
                    .into_iter()
                    .next()
                    .ok_or_else(ExtractionFailure::no_download_url)?;
                let download_url = first.url.ok_or_else(ExtractionFailure::no_download_url)?;

                Ok(NormalizedMedia {
                    download_url,
                    video_info: VideoInfo {
                        title: Some(title),
                        thumbnail: p.thumbnail.or(first.thumbnail),
                        author: Some(author),
                        kind: Some(or_default(first.kind, DEFAULT_KIND)),
                        quality: Some(or_default(
                            first.quality.or(first.extension),
                            DEFAULT_QUALITY,
                        )),
                        format: None,
                        duration: Some(duration),
                    },
                })
            }
            AioPayload::Single(p) => Ok(NormalizedMedia {
                download_url: p.url,
                video_info: VideoInfo {
                    title: Some(or_default(p.title.or(p.caption), DEFAULT_TITLE)),
                    thumbnail: p.thumbnail,
                    author: Some(or_default(p.author.or(p.username), DEFAULT_AUTHOR)),
                    kind: Some(or_default(p.kind, DEFAULT_KIND)),
                    quality: Some(or_default(p.quality, DEFAULT_QUALITY)),
                    format: None,
                    duration: None,
                },
            }),
            AioPayload::Legacy(p) => Ok(NormalizedMedia {
                download_url: p.video_url,
                video_info: VideoInfo {
                    title: Some(or_default(p.title.or(p.desc), DEFAULT_LEGACY_TITLE)),
                    thumbnail: p.cover.or(p.thumbnail),
                    author: Some(or_default(p.author.or(p.username), DEFAULT_AUTHOR)),
                    kind: Some(DEFAULT_KIND.to_string()),
                    quality: Some(DEFAULT_QUALITY.to_string()),
                    format: None,
                    duration: None,
                },
            }),
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value.unwrap_or_else(|| default.to_string())
}

pub fn normalize(platform: Platform, raw: Value) -> Result<NormalizedMedia, ExtractionFailure> {
    let payload = AioPayload::decode(raw).ok_or_else(|| {
        tracing::debug!("{}: payload matched no known shape", platform);
        ExtractionFailure::no_download_url()
    })?;

    tracing::debug!("{}: payload decoded as '{}' shape", platform, payload.shape());
    payload.into_media()
}
