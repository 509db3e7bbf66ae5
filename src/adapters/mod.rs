//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the diagnostic service
//! - `sanitize`: PII filtering for logs

pub mod http;
pub mod sanitize;

pub use http::HttpDiagnosticClient;
