use std::sync::Arc;

use async_trait::async_trait;

use media_relay_core::core::error::{ExtractionFailure, RelayError};
use media_relay_core::core::steps::StepOutcome;
use media_relay_core::models::media::{MediaKind, YOUTUBE_PROBE_FORMAT};
use media_relay_core::models::request::DownloadRequest;
use media_relay_core::models::response::{DownloadResult, FormatSelection, RelayResponse};

use crate::core::upstream::UpstreamClient;
use crate::platforms::traits::PlatformRelay;
use crate::platforms::Platform;

const METHOD: &str = "NekoLabs API";

/// Two-phase YouTube flow: without a format the client gets the format menu,
/// with one it gets a direct link for that format.
pub struct YouTubeRelay {
    upstream: Arc<UpstreamClient>,
}

impl YouTubeRelay {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }

    async fn discover_formats(&self, request: &DownloadRequest) -> StepOutcome<FormatSelection> {
        const STEP: &str = "youtube-format-discovery";
        let settings = self.upstream.settings();

        tracing::info!("YouTube: getting available formats for {}", request.url);

        let envelope = match self
            .upstream
            .youtube(&request.url, YOUTUBE_PROBE_FORMAT, settings.probe_timeout)
            .await
        {
            Ok(envelope) => envelope,
            Err(err) => return StepOutcome::upstream_failure(STEP, err, settings.detailed_errors),
        };

        match envelope.into_result() {
            Some(media) => {
                tracing::info!("YouTube: got video info for format selection");
                StepOutcome::Resolved(FormatSelection::new(
                    request.platform,
                    &request.url,
                    media.probe_info(),
                ))
            }
            None => StepOutcome::continue_with(STEP, "Could not get video information"),
        }
    }

    async fn fetch_format(&self, request: &DownloadRequest) -> StepOutcome<DownloadResult> {
        const STEP: &str = "youtube-format-fetch";
        let settings = self.upstream.settings();
        let selected = request.selected_format();

        tracing::info!("YouTube: fetching {} ({})", request.url, selected);

        let envelope = match self
            .upstream
            .youtube(&request.url, selected, settings.fetch_timeout)
            .await
        {
            Ok(envelope) => envelope,
            Err(err) => return StepOutcome::upstream_failure(STEP, err, settings.detailed_errors),
        };

        let response_time = envelope.response_time.clone();
        let Some(media) = envelope.into_result() else {
            return StepOutcome::continue_with(STEP, ExtractionFailure::invalid_response(METHOD).0);
        };
        // A result without a link answers 503 rather than a success with the field left out.
        let Some(download_url) = media.download_url.clone() else {
            return StepOutcome::continue_with(STEP, ExtractionFailure::no_download_url().0);
        };

        tracing::info!(
            "YouTube: '{}' ready ({}, {})",
            media.title.as_deref().unwrap_or("untitled"),
            media.quality.as_deref().unwrap_or("unknown quality"),
            media.kind.as_deref().unwrap_or("video")
        );

        let kind = MediaKind::from_upstream(media.kind.as_deref());
        StepOutcome::Resolved(DownloadResult {
            success: true,
            download_url,
            platform: request.platform,
            original_url: request.url.clone(),
            selected_format: Some(selected.to_string()),
            video_info: media.download_info(),
            method: METHOD.to_string(),
            response_time,
            note: format!("{} ready for download via {}", kind.label(), METHOD),
        })
    }
}

#[async_trait]
impl PlatformRelay for YouTubeRelay {
    fn name(&self) -> &str {
        "youtube"
    }

    fn can_handle(&self, platform: Platform) -> bool {
        platform == Platform::YouTube
    }

    async fn relay(&self, request: &DownloadRequest) -> Result<RelayResponse, RelayError> {
        let outcome = if request.needs_format_selection() {
            self.discover_formats(request).await.map(RelayResponse::from)
        } else {
            self.fetch_format(request).await.map(RelayResponse::from)
        };

        outcome.settle(|| RelayError::unavailable(request))
    }
}
