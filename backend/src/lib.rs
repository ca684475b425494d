//! Live polling back end: poll lifecycle, vote tallying, realtime mirroring
//! and generated-text assistance behind a REST API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
