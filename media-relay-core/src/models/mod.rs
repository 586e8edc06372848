pub mod lenient;
pub mod media;
pub mod request;
pub mod response;
pub mod settings;
pub mod upstream;
