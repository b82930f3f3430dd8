//! Browser implementations.
//!
//! - `HttpBrowser` - plain HTTP fetching with reqwest
//! - `RateLimitedBrowser` - wrapper that adds a request ceiling

pub mod http;
pub mod rate_limited;

pub use http::HttpBrowser;
pub use rate_limited::{BrowserExt, RateLimitedBrowser};
