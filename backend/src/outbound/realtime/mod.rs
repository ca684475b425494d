//! Realtime broadcast store adapters.
//!
//! The mirror copies committed rows into a hosted table store whose change
//! stream drives live client updates.

mod dto;
mod http_mirror;

pub use http_mirror::HttpRealtimeMirror;
