//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: in-process repositories for database-less runs and tests
//! - **realtime**: HTTP writer for the realtime broadcast store
//! - **generative**: HTTP client for the generative text service
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod generative;
pub mod memory;
pub mod persistence;
pub mod realtime;

use reqwest::Url;

/// Ensure relative joins append to the last path segment instead of
/// replacing it.
pub(crate) fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}
