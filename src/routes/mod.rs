use std::any::Any;

use axum::body::Bytes;
use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use media_relay_core::core::error::{RelayError, ValidationError};
use media_relay_core::models::request::{DownloadRequest, RawDownloadRequest};
use media_relay_core::models::response::{ApiInfo, ErrorEnvelope, HealthReport, RelayResponse};

use crate::AppState;

const NOT_FOUND_MESSAGE: &str = "Endpoint not found";
const PANIC_MESSAGE: &str = "Internal server error";

/// HTTP face of [`RelayError`]: the classified status with the error envelope.
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(RelayError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let classification = self.0.classification();
        let status = StatusCode::from_u16(classification.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("request failed with {}: {}", status, self.0);
        } else {
            tracing::warn!("request rejected with {}: {}", status, self.0);
        }

        (status, Json(self.0.to_envelope())).into_response()
    }
}

pub async fn download(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let request = DownloadRequest::try_from(RawDownloadRequest::from_body(&body))?;

    tracing::info!("Download request: {} - {}", request.platform, request.url);

    let relay = state
        .registry
        .find_platform(request.platform)
        .ok_or(RelayError::NotImplemented(request.platform))?;
    tracing::debug!("{} handled by '{}' relay", request.platform, relay.name());

    let response = relay.relay(&request).await?;
    Ok(Json(response))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    Json(HealthReport::new(
        timestamp,
        state.started_at.elapsed().as_secs_f64(),
    ))
}

pub async fn api_info() -> Json<ApiInfo> {
    Json(ApiInfo::new(env!("CARGO_PKG_VERSION")))
}

pub async fn not_found() -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorEnvelope::new(NOT_FOUND_MESSAGE)),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!("handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope::new(PANIC_MESSAGE)),
    )
        .into_response()
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
            AUTHORIZATION,
        ])
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/download", post(download).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .route("/api/info", get(api_info).fallback(not_found));

    let router = match state.settings.server.static_dir.as_ref() {
        Some(dir) if dir.is_dir() => {
            tracing::info!("serving static files from {}", dir.display());
            router.fallback_service(
                ServeDir::new(dir)
                    .call_fallback_on_method_not_allowed(true)
                    .fallback(not_found.into_service()),
            )
        }
        Some(dir) => {
            tracing::warn!("static directory {} not found, UI disabled", dir.display());
            router.fallback(not_found)
        }
        None => router.fallback(not_found),
    };

    router
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(build_cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use media_relay_core::models::settings::RelaySettings;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_with(tweak: impl FnOnce(&mut RelaySettings)) -> Router {
        let mut settings = RelaySettings::default();
        settings.server.static_dir = None;
        tweak(&mut settings);
        build_router(AppState::new(settings).unwrap())
    }

    fn app_for(server: &MockServer) -> Router {
        let base = server.uri();
        app_with(|s| s.upstream.base_url = base)
    }

    async fn post_download(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/download")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        for body in [
            json!({"platform": "youtube"}),
            json!({"url": "https://youtu.be/x"}),
            json!({"url": "", "platform": "youtube"}),
            json!({}),
        ] {
            let (status, value) = post_download(app_with(|_| {}), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                value,
                json!({"success": false, "message": "URL and platform are required"})
            );
        }
    }

    #[tokio::test]
    async fn unparseable_body_counts_as_missing_fields() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/download")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, value) = send(app_with(|_| {}), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["message"], "URL and platform are required");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected() {
        let (status, value) =
            post_download(app_with(|_| {}), json!({"url": "not-a-url", "platform": "tiktok"}))
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["message"], "Invalid URL format");
    }

    #[tokio::test]
    async fn unknown_platform_is_rejected() {
        let (status, value) = post_download(
            app_with(|_| {}),
            json!({"url": "https://vimeo.com/1", "platform": "vimeo"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["message"], "Unsupported platform");
    }

    #[tokio::test]
    async fn youtube_without_format_lists_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloader/youtube/v1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "result": {"title": "Clip", "duration": "4:01", "cover": "https://i.ytimg.com/x.jpg", "type": "video"}
            })))
            .mount(&server)
            .await;

        let (status, value) = post_download(
            app_for(&server),
            json!({"url": "https://www.youtube.com/watch?v=abc", "platform": "youtube"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["requiresFormatSelection"], true);
        assert_eq!(value["videoInfo"]["thumbnail"], "https://i.ytimg.com/x.jpg");
        let formats: Vec<_> = value["availableFormats"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["format"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(formats, ["mp3", "144", "240", "360", "480", "720", "1080"]);
    }

    #[tokio::test]
    async fn aio_timeout_answers_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "result": {"url": "https://x"}}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let base = server.uri();
        let app = app_with(|s| {
            s.upstream.base_url = base;
            s.upstream.fetch_timeout = Duration::from_millis(100);
        });
        let (status, value) = post_download(
            app,
            json!({"url": "https://www.tiktok.com/@a/video/1", "platform": "tiktok"}),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            value["message"],
            "Tiktok download service is temporarily unavailable. Please try again later."
        );
        assert_eq!(value["platform"], "tiktok");
        assert_eq!(value["originalUrl"], "https://www.tiktok.com/@a/video/1");
        assert_eq!(value["note"], "Service temporarily unavailable");
    }

    #[tokio::test]
    async fn detailed_errors_expose_rate_limit_and_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloader/aio/v1"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/downloader/youtube/v1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "result": {}}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let base = server.uri();
        let app = app_with(|s| {
            s.upstream.base_url = base;
            s.upstream.detailed_errors = true;
            s.upstream.fetch_timeout = Duration::from_millis(100);
        });

        let (status, value) = post_download(
            app.clone(),
            json!({"url": "https://www.instagram.com/p/x/", "platform": "instagram"}),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            value["message"],
            "Too many requests - please wait before trying again"
        );

        let (status, value) = post_download(
            app,
            json!({"url": "https://youtu.be/x", "platform": "youtube", "format": "720"}),
        )
        .await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(value["message"], "Request timeout - video may be too large");
    }

    #[tokio::test]
    async fn unregistered_platform_is_not_implemented() {
        let state = AppState {
            registry: Default::default(),
            ..AppState::new(RelaySettings::default()).unwrap()
        };
        let app = Router::new()
            .route("/download", post(download))
            .with_state(state);

        let (status, value) = post_download(
            app,
            json!({"url": "https://www.facebook.com/watch?v=1", "platform": "facebook"}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(value["message"], "facebook downloads are not yet implemented.");
    }

    #[tokio::test]
    async fn health_reports_without_upstream() {
        let app = app_with(|s| s.upstream.base_url = "http://127.0.0.1:1".into());
        let (status, value) = send(app, get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "ok");
        assert_eq!(
            value["supportedPlatforms"],
            json!(["youtube", "tiktok", "instagram", "facebook", "rednote"])
        );
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(value["uptime"].as_f64().unwrap() >= 0.0);
    }

    #[tokio::test]
    async fn api_info_is_served() {
        let (status, value) = send(app_with(|_| {}), get_request("/api/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["endpoints"]["health"], "GET /health");
    }

    #[tokio::test]
    async fn unknown_routes_get_envelope() {
        let (status, value) = send(app_with(|_| {}), get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value, json!({"success": false, "message": "Endpoint not found"}));

        let (status, _) = send(app_with(|_| {}), get_request("/download")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn static_misses_fall_back_to_envelope() {
        let dir = std::env::temp_dir();
        let app = app_with(|s| s.server.static_dir = Some(dir));
        let (status, value) = send(app, get_request("/definitely-not-a-file.txt")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["message"], "Endpoint not found");
    }

    #[tokio::test]
    async fn preflight_is_answered() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/download")
            .header(ORIGIN, "https://example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app_with(|_| {}).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn requests_are_logged_under_default_filter() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(crate::DEFAULT_LOG_FILTER))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (status, _) = send(app_with(|_| {}), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("finished processing request"), "{output}");
        assert!(output.contains("/health"), "{output}");
    }

    #[tokio::test]
    async fn panics_become_internal_error() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let (status, value) = send(app, get_request("/boom")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(value["message"], "Internal server error");
    }
}
