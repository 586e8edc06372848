pub use media_relay_core::platforms::Platform;

pub mod aio;
pub mod traits;
pub mod youtube;
