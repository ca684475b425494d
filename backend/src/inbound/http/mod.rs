//! HTTP inbound adapter exposing the REST API.

pub mod assist;
pub mod error;
pub mod health;
pub mod identity;
pub mod me;
pub mod polls;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

/// Register every API handler. Mount under `/api/v1`.
///
/// `/polls/public` is registered ahead of `/polls/{id}` so it is not read as
/// a poll id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(polls::create_poll)
        .service(polls::list_public_polls)
        .service(polls::get_poll)
        .service(polls::cast_vote)
        .service(polls::poll_results)
        .service(polls::voter_details)
        .service(assist::analyze_results)
        .service(assist::suggest_options)
        .service(me::user_polls)
        .service(me::vote_history)
        .service(me::dashboard_stats);
}
