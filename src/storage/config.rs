use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use media_relay_core::models::settings::RelaySettings;

pub fn load_settings() -> RelaySettings {
    load_from(|name| std::env::var(name).ok())
}

/// Builds settings from a variable lookup. Unset or malformed values keep the
/// defaults; malformed ones are logged.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> RelaySettings {
    let mut settings = RelaySettings::default();
    let var = |name: &str| lookup(name).map(|v| v.trim().to_string());

    if let Some(host) = var("HOST").filter(|h| !h.is_empty()) {
        settings.server.host = host;
    }
    if let Some(port) = parse_var(&var, "PORT") {
        settings.server.port = port;
    }
    if let Some(dir) = var("RELAY_STATIC_DIR") {
        settings.server.static_dir = non_empty(&dir).map(PathBuf::from);
    }

    let upstream = &mut settings.upstream;
    if let Some(base) = var("RELAY_UPSTREAM_BASE_URL").filter(|v| !v.is_empty()) {
        match url::Url::parse(&base) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => upstream.base_url = base,
            _ => tracing::warn!("ignoring RELAY_UPSTREAM_BASE_URL={:?}: not an http(s) URL", base),
        }
    }
    if let Some(path) = var("RELAY_YOUTUBE_PATH").filter(|v| !v.is_empty()) {
        upstream.youtube_path = path;
    }
    if let Some(path) = var("RELAY_AIO_PATH").filter(|v| !v.is_empty()) {
        upstream.aio_path = path;
    }
    if let Some(agent) = var("RELAY_USER_AGENT").filter(|v| !v.is_empty()) {
        upstream.user_agent = agent;
    }
    if let Some(secs) = parse_var::<u64>(&var, "RELAY_PROBE_TIMEOUT_SECS").filter(|s| *s > 0) {
        upstream.probe_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = parse_var::<u64>(&var, "RELAY_FETCH_TIMEOUT_SECS").filter(|s| *s > 0) {
        upstream.fetch_timeout = Duration::from_secs(secs);
    }
    if let Some(proxy) = var("RELAY_PROXY_URL") {
        upstream.proxy_url = non_empty(&proxy).map(str::to_string);
    }
    if let Some(raw) = var("RELAY_DETAILED_UPSTREAM_ERRORS") {
        match read_bool(&raw) {
            Some(flag) => upstream.detailed_errors = flag,
            None => tracing::warn!(
                "ignoring RELAY_DETAILED_UPSTREAM_ERRORS={:?}: expected a boolean",
                raw
            ),
        }
    }

    settings
}

fn parse_var<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = var(name)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {}={:?}: not a valid value", name, raw);
            None
        }
    }
}

fn read_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
