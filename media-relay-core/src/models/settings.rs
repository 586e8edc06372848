use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Process-wide configuration, assembled once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub server: ServerSettings,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory with the browser UI. `None` disables static serving.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub youtube_path: String,
    pub aio_path: String,
    pub user_agent: String,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
    pub proxy_url: Option<String>,
    /// Propagate upstream status, transport and timeout failures to the
    /// client instead of answering every branch failure with 503.
    pub detailed_errors: bool,
}

impl UpstreamSettings {
    pub fn youtube_endpoint(&self) -> String {
        join_endpoint(&self.base_url, &self.youtube_path)
    }

    pub fn aio_endpoint(&self) -> String {
        join_endpoint(&self.base_url, &self.aio_path)
    }
}

fn join_endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".into(),
                port: 3000,
                static_dir: Some(PathBuf::from("public")),
            },
            upstream: UpstreamSettings::default(),
        }
    }
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.nekolabs.web.id".into(),
            youtube_path: "/downloader/youtube/v1".into(),
            aio_path: "/downloader/aio/v1".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            probe_timeout: Duration::from_secs(15),
            fetch_timeout: Duration::from_secs(30),
            proxy_url: None,
            detailed_errors: false,
        }
    }
}
