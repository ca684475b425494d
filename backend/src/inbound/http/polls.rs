//! Poll and vote HTTP handlers.
//!
//! ```text
//! POST /api/v1/polls
//! GET  /api/v1/polls/public
//! GET  /api/v1/polls/{id}
//! POST /api/v1/polls/{id}/votes
//! GET  /api/v1/polls/{id}/results
//! GET  /api/v1/polls/{id}/voters
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{CreatePollRequest, PollResults, PollView};
use crate::domain::{ApiResult, Error, Poll, PollId, Vote, VoterDetail};
use crate::inbound::http::identity::RequestIdentity;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request payload for casting a vote.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    /// Zero-based index into the poll's options.
    pub option_index: i64,
}

pub(crate) fn parse_poll_id(raw: &str) -> Result<PollId, Error> {
    raw.parse().map_err(|_| {
        Error::invalid_request("poll id must be a valid UUID").with_details(json!({
            "field": "id",
            "value": raw,
            "code": "invalid_poll_id",
        }))
    })
}

/// Create a poll owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/polls",
    request_body = CreatePollRequest,
    responses(
        (status = 201, description = "Poll created", body = Poll),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    params(
        ("X-Identity-Id" = String, Header, description = "Caller identity")
    ),
    tags = ["polls"],
    operation_id = "createPoll"
)]
#[post("/polls")]
pub async fn create_poll(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
    payload: web::Json<CreatePollRequest>,
) -> ApiResult<HttpResponse> {
    let poll = state
        .polls
        .create_poll(payload.into_inner(), caller.identity())
        .await?;
    Ok(HttpResponse::Created().json(poll))
}

/// Public polls that have not ended, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/polls/public",
    responses(
        (status = 200, description = "Open public polls", body = [PollView]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["polls"],
    operation_id = "listPublicPolls"
)]
#[get("/polls/public")]
pub async fn list_public_polls(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<PollView>>> {
    Ok(web::Json(state.polls_query.list_public_polls().await?))
}

/// Fetch one poll with its current status.
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}",
    params(("id" = String, Path, description = "Poll identifier")),
    responses(
        (status = 200, description = "Poll", body = PollView),
        (status = 400, description = "Invalid poll id", body = ErrorSchema),
        (status = 404, description = "Poll not found", body = ErrorSchema)
    ),
    tags = ["polls"],
    operation_id = "getPoll"
)]
#[get("/polls/{id}")]
pub async fn get_poll(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PollView>> {
    let poll_id = parse_poll_id(&path)?;
    state
        .polls_query
        .get_poll(poll_id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("Poll not found"))
}

/// Vote for one option of a poll.
#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/votes",
    request_body = CastVoteRequest,
    params(
        ("id" = String, Path, description = "Poll identifier"),
        ("X-Identity-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 201, description = "Vote recorded", body = Vote),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Poll not found", body = ErrorSchema)
    ),
    tags = ["polls"],
    operation_id = "castVote"
)]
#[post("/polls/{id}/votes")]
pub async fn cast_vote(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
    path: web::Path<String>,
    payload: web::Json<CastVoteRequest>,
) -> ApiResult<HttpResponse> {
    let poll_id = parse_poll_id(&path)?;
    let vote = state
        .polls
        .cast_vote(poll_id, payload.option_index, caller.external_id())
        .await?;
    Ok(HttpResponse::Created().json(vote))
}

/// Tally and raw votes of a poll.
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}/results",
    params(("id" = String, Path, description = "Poll identifier")),
    responses(
        (status = 200, description = "Poll results", body = PollResults),
        (status = 404, description = "Poll not found", body = ErrorSchema)
    ),
    tags = ["polls"],
    operation_id = "getPollResults"
)]
#[get("/polls/{id}/results")]
pub async fn poll_results(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PollResults>> {
    let poll_id = parse_poll_id(&path)?;
    Ok(web::Json(state.polls_query.poll_results(poll_id).await?))
}

/// Who voted for what, visible to the poll owner only.
#[utoipa::path(
    get,
    path = "/api/v1/polls/{id}/voters",
    params(
        ("id" = String, Path, description = "Poll identifier"),
        ("X-Identity-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Voter rows, newest first", body = [VoterDetail]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller does not own the poll", body = ErrorSchema),
        (status = 404, description = "Poll not found", body = ErrorSchema)
    ),
    tags = ["polls"],
    operation_id = "listPollVoters"
)]
#[get("/polls/{id}/voters")]
pub async fn voter_details(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<VoterDetail>>> {
    let poll_id = parse_poll_id(&path)?;
    let rows = state
        .polls_query
        .voter_details(poll_id, caller.external_id())
        .await?;
    Ok(web::Json(rows))
}

#[cfg(test)]
#[path = "polls_tests.rs"]
mod tests;
