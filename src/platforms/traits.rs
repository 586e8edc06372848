use async_trait::async_trait;

use media_relay_core::core::error::RelayError;
use media_relay_core::models::request::DownloadRequest;
use media_relay_core::models::response::RelayResponse;
use media_relay_core::platforms::Platform;

#[async_trait]
pub trait PlatformRelay: Send + Sync {
    fn name(&self) -> &str;
    fn can_handle(&self, platform: Platform) -> bool;
    async fn relay(&self, request: &DownloadRequest) -> Result<RelayResponse, RelayError>;
}
