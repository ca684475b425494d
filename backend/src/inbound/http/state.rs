//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{PollAssist, PollsCommand, PollsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub polls: Arc<dyn PollsCommand>,
    pub polls_query: Arc<dyn PollsQuery>,
    pub assist: Arc<dyn PollAssist>,
}

impl HttpState {
    pub fn new(
        polls: Arc<dyn PollsCommand>,
        polls_query: Arc<dyn PollsQuery>,
        assist: Arc<dyn PollAssist>,
    ) -> Self {
        Self {
            polls,
            polls_query,
            assist,
        }
    }
}
