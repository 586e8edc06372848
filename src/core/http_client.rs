use media_relay_core::models::settings::UpstreamSettings;

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy_url: Option<&str>,
) -> reqwest::ClientBuilder {
    let proxy_url = match proxy_url.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return builder,
    };
    match reqwest::Proxy::all(proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}

/// Shared client for every upstream call. Timeouts are applied per request,
/// since probes and fetches have different budgets.
pub fn build_client(settings: &UpstreamSettings) -> anyhow::Result<reqwest::Client> {
    let builder = reqwest::Client::builder().user_agent(settings.user_agent.as_str());
    let client = apply_proxy(builder, settings.proxy_url.as_deref()).build()?;
    Ok(client)
}
