use std::sync::Arc;

use async_trait::async_trait;

use media_relay_core::core::error::{ExtractionFailure, RelayError};
use media_relay_core::core::normalizer;
use media_relay_core::core::steps::StepOutcome;
use media_relay_core::models::request::DownloadRequest;
use media_relay_core::models::response::{DownloadResult, RelayResponse};

use crate::core::upstream::UpstreamClient;
use crate::platforms::traits::PlatformRelay;
use crate::platforms::Platform;

const METHOD: &str = "NekoLabs AIO API";

/// TikTok, Instagram, Facebook and RedNote all go through the all-in-one
/// endpoint; only the payload shape differs.
pub struct AioRelay {
    upstream: Arc<UpstreamClient>,
}

impl AioRelay {
    pub fn new(upstream: Arc<UpstreamClient>) -> Self {
        Self { upstream }
    }

    async fn fetch(&self, request: &DownloadRequest) -> StepOutcome<DownloadResult> {
        const STEP: &str = "aio-fetch";
        let settings = self.upstream.settings();

        tracing::info!("{}: fetching {}", request.platform, request.url);

        let envelope = match self.upstream.aio(&request.url, settings.fetch_timeout).await {
            Ok(envelope) => envelope,
            Err(err) => return StepOutcome::upstream_failure(STEP, err, settings.detailed_errors),
        };

        let response_time = envelope.response_time.clone();
        let Some(raw) = envelope.into_result() else {
            return StepOutcome::continue_with(STEP, ExtractionFailure::invalid_response(METHOD).0);
        };

        let media = match normalizer::normalize(request.platform, raw) {
            Ok(media) => media,
            Err(failure) => return StepOutcome::continue_with(STEP, failure.0),
        };

        tracing::info!(
            "{}: content found: {}",
            request.platform,
            media.video_info.title.as_deref().unwrap_or("untitled")
        );

        StepOutcome::Resolved(DownloadResult {
            success: true,
            download_url: media.download_url,
            platform: request.platform,
            original_url: request.url.clone(),
            selected_format: None,
            video_info: media.video_info,
            method: METHOD.to_string(),
            response_time,
            note: format!(
                "{} content ready for download",
                request.platform.display_name()
            ),
        })
    }
}

#[async_trait]
impl PlatformRelay for AioRelay {
    fn name(&self) -> &str {
        "aio"
    }

    fn can_handle(&self, platform: Platform) -> bool {
        platform.uses_aio()
    }

    async fn relay(&self, request: &DownloadRequest) -> Result<RelayResponse, RelayError> {
        self.fetch(request)
            .await
            .map(RelayResponse::from)
            .settle(|| RelayError::unavailable(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use media_relay_core::core::error::UpstreamError;
    use media_relay_core::models::settings::UpstreamSettings;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay_for(server: &MockServer, detailed_errors: bool) -> AioRelay {
        let settings = UpstreamSettings {
            base_url: server.uri(),
            detailed_errors,
            ..Default::default()
        };
        AioRelay::new(Arc::new(UpstreamClient::new(&settings).unwrap()))
    }

    fn request(platform: Platform, url: &str) -> DownloadRequest {
        DownloadRequest {
            url: url.into(),
            platform,
            format: None,
            quality: None,
        }
    }

    async fn mount_result(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/downloader/aio/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn tiktok_media_list_resolves_first_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloader/aio/v1"))
            .and(query_param("url", "https://www.tiktok.com/@user/video/123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "responseTime": 812,
                "result": {
                    "title": "dance",
                    "author": "user",
                    "medias": [
                        {"url": "https://cdn.example/nowm.mp4", "type": "video", "quality": "hd"},
                        {"url": "https://cdn.example/music.mp3", "type": "audio"}
                    ]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = relay_for(&server, false)
            .relay(&request(Platform::TikTok, "https://www.tiktok.com/@user/video/123"))
            .await
            .unwrap();
        let RelayResponse::Download(result) = response else {
            panic!("expected download result");
        };
        assert_eq!(result.download_url, "https://cdn.example/nowm.mp4");
        assert_eq!(result.method, "NekoLabs AIO API");
        assert_eq!(result.note, "Tiktok content ready for download");
        assert_eq!(result.video_info.author.as_deref(), Some("user"));
        assert!(result.selected_format.is_none());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["responseTime"], 812);
    }

    #[tokio::test]
    async fn rednote_legacy_shape_resolves() {
        let server = MockServer::start().await;
        mount_result(
            &server,
            json!({
                "success": true,
                "result": {"video_url": "https://cdn.example/note.mp4", "desc": "a note"}
            }),
        )
        .await;

        let response = relay_for(&server, false)
            .relay(&request(Platform::RedNote, "https://xhslink.com/a/b"))
            .await
            .unwrap();
        let RelayResponse::Download(result) = response else {
            panic!("expected download result");
        };
        assert_eq!(result.download_url, "https://cdn.example/note.mp4");
        assert_eq!(result.note, "Rednote content ready for download");
    }

    #[tokio::test]
    async fn unrecognised_payload_is_unavailable() {
        let server = MockServer::start().await;
        mount_result(
            &server,
            json!({"success": true, "result": {"medias": [], "title": "empty"}}),
        )
        .await;

        let err = relay_for(&server, false)
            .relay(&request(Platform::Instagram, "https://www.instagram.com/p/abc/"))
            .await
            .unwrap_err();
        match err {
            RelayError::ServiceUnavailable {
                platform,
                original_url,
            } => {
                assert_eq!(platform, Platform::Instagram);
                assert_eq!(original_url, "https://www.instagram.com/p/abc/");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_unavailable() {
        let server = MockServer::start().await;
        mount_result(&server, json!({"success": false, "result": {"url": "https://x"}})).await;

        let err = relay_for(&server, false)
            .relay(&request(Platform::Facebook, "https://www.facebook.com/watch?v=1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::ServiceUnavailable { .. }));
    }

    #[tokio::test]
    async fn upstream_status_is_hidden_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = relay_for(&server, false)
            .relay(&request(Platform::TikTok, "https://vm.tiktok.com/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::ServiceUnavailable { .. }));

        let err = relay_for(&server, true)
            .relay(&request(Platform::TikTok, "https://vm.tiktok.com/x"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelayError::Upstream(UpstreamError::Status { status: 403, .. })
        ));
    }

    #[test]
    fn handles_every_aio_platform() {
        let relay = AioRelay::new(Arc::new(
            UpstreamClient::new(&UpstreamSettings::default()).unwrap(),
        ));
        for platform in [
            Platform::TikTok,
            Platform::Instagram,
            Platform::Facebook,
            Platform::RedNote,
        ] {
            assert!(relay.can_handle(platform));
        }
        assert!(!relay.can_handle(Platform::YouTube));
    }
}
