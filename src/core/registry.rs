use std::sync::Arc;

use media_relay_core::platforms::Platform;

use crate::platforms::traits::PlatformRelay;

pub struct PlatformRegistry {
    platforms: Vec<Arc<dyn PlatformRelay>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self {
            platforms: Vec::new(),
        }
    }

    pub fn register(&mut self, platform: Arc<dyn PlatformRelay>) {
        self.platforms.push(platform);
    }

    pub fn find_platform(&self, platform: Platform) -> Option<&dyn PlatformRelay> {
        self.platforms
            .iter()
            .find(|p| p.can_handle(platform))
            .map(|p| p.as_ref())
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
