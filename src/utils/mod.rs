#[cfg(feature = "browser")]
pub mod browser;
pub mod http;
pub mod progress;

pub use http::{HttpFetcher, PageFetcher};
