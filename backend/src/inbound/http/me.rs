//! Caller-scoped views.
//!
//! ```text
//! GET /api/v1/me/polls
//! GET /api/v1/me/votes
//! GET /api/v1/me/dashboard
//! ```

use actix_web::{get, web};

use crate::domain::ports::{DashboardStats, PollView};
use crate::domain::{ApiResult, VoteHistoryEntry};
use crate::inbound::http::identity::RequestIdentity;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Polls created by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/me/polls",
    params(("X-Identity-Id" = String, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Owned polls", body = [PollView]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["me"],
    operation_id = "listMyPolls"
)]
#[get("/me/polls")]
pub async fn user_polls(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
) -> ApiResult<web::Json<Vec<PollView>>> {
    let polls = state.polls_query.user_polls(caller.external_id()).await?;
    Ok(web::Json(polls))
}

/// Votes cast by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/me/votes",
    params(("X-Identity-Id" = String, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Vote history", body = [VoteHistoryEntry]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["me"],
    operation_id = "listMyVotes"
)]
#[get("/me/votes")]
pub async fn vote_history(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
) -> ApiResult<web::Json<Vec<VoteHistoryEntry>>> {
    let history = state.polls_query.vote_history(caller.external_id()).await?;
    Ok(web::Json(history))
}

/// Totals over the caller's polls.
#[utoipa::path(
    get,
    path = "/api/v1/me/dashboard",
    params(("X-Identity-Id" = String, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["me"],
    operation_id = "getMyDashboard"
)]
#[get("/me/dashboard")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    caller: RequestIdentity,
) -> ApiResult<web::Json<DashboardStats>> {
    let stats = state
        .polls_query
        .dashboard_stats(caller.external_id())
        .await?;
    Ok(web::Json(stats))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockPollAssist, MockPollsCommand, MockPollsQuery, PopularPoll};
    use crate::domain::{Error, PollId};
    use crate::inbound::http::identity::IDENTITY_ID_HEADER;
    use crate::inbound::http::test_utils::test_state;

    async fn get_as(
        query: MockPollsQuery,
        uri: &str,
        identity: Option<&'static str>,
    ) -> (StatusCode, Value) {
        let state = test_state(MockPollsCommand::new(), query, MockPollAssist::new());
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").configure(crate::inbound::http::configure)),
        )
        .await;
        let mut request = actix_test::TestRequest::get().uri(uri);
        if let Some(id) = identity {
            request = request.insert_header((IDENTITY_ID_HEADER, id));
        }
        let res = actix_test::call_service(&app, request.to_request()).await;
        let status = res.status();
        (status, actix_test::read_body_json(res).await)
    }

    #[actix_web::test]
    async fn dashboard_is_scoped_to_the_caller() {
        let poll_id = PollId::random();
        let mut query = MockPollsQuery::new();
        query
            .expect_dashboard_stats()
            .withf(|owner| owner.as_ref() == "user_1")
            .times(1)
            .return_once(move |_| {
                Ok(DashboardStats {
                    total_polls: 2,
                    total_votes: 5,
                    most_popular_poll: Some(PopularPoll {
                        poll_id,
                        topic: "Lunch".into(),
                        votes: 4,
                    }),
                })
            });

        let (status, body) = get_as(query, "/api/v1/me/dashboard", Some("user_1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalPolls"], json!(2));
        assert_eq!(body["mostPopularPoll"]["pollId"], json!(poll_id.to_string()));
    }

    #[actix_web::test]
    async fn unknown_owner_dashboard_is_not_found() {
        let mut query = MockPollsQuery::new();
        query
            .expect_dashboard_stats()
            .return_once(|_| Err(Error::not_found("User not found")));

        let (status, body) = get_as(query, "/api/v1/me/dashboard", Some("ghost")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], json!("User not found"));
    }

    #[actix_web::test]
    async fn history_requires_identity() {
        let (status, body) = get_as(MockPollsQuery::new(), "/api/v1/me/votes", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("unauthorized"));
    }

    #[actix_web::test]
    async fn owned_polls_pass_through() {
        let mut query = MockPollsQuery::new();
        query
            .expect_user_polls()
            .times(1)
            .return_once(|_| Ok(Vec::new()));

        let (status, body) = get_as(query, "/api/v1/me/polls", Some("user_1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }
}
