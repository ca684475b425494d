//! Generated-text helpers exposed over HTTP.
//!
//! ```text
//! POST /api/v1/assist/options
//! POST /api/v1/polls/{id}/analysis
//! ```
//!
//! Both answer `200` with a tagged body even when generation fails, so clients
//! can fall back to manual input.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ApiResult;
use crate::domain::PollAnalysis;
use crate::domain::ports::AssistOutcome;
use crate::inbound::http::identity::RequestIdentity;
use crate::inbound::http::polls::parse_poll_id;
use crate::inbound::http::schemas::{
    AnalysisResponseSchema, ErrorSchema, SuggestOptionsResponseSchema,
};
use crate::inbound::http::state::HttpState;

/// Request payload for option suggestions.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SuggestOptionsRequest {
    pub topic: String,
}

/// `{"success": true, "data": ...}` or `{"success": false, "error": "..."}`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<AssistOutcome<T>> for AssistResponse<T> {
    fn from(outcome: AssistOutcome<T>) -> Self {
        match outcome {
            AssistOutcome::Success(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            AssistOutcome::Failure { error } => Self {
                success: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

/// Suggest options for a poll topic.
#[utoipa::path(
    post,
    path = "/api/v1/assist/options",
    request_body = SuggestOptionsRequest,
    params(("X-Identity-Id" = String, Header, description = "Caller identity")),
    responses(
        (status = 200, description = "Tagged suggestion outcome", body = SuggestOptionsResponseSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["assist"],
    operation_id = "suggestOptions"
)]
#[post("/assist/options")]
pub async fn suggest_options(
    state: web::Data<HttpState>,
    _caller: RequestIdentity,
    payload: web::Json<SuggestOptionsRequest>,
) -> web::Json<AssistResponse<Vec<String>>> {
    let outcome = state.assist.suggest_options(&payload.topic).await;
    web::Json(outcome.into())
}

/// Summarise the current results of a poll and store the summary on it.
#[utoipa::path(
    post,
    path = "/api/v1/polls/{id}/analysis",
    params(
        ("id" = String, Path, description = "Poll identifier"),
        ("X-Identity-Id" = String, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Tagged analysis outcome", body = AnalysisResponseSchema),
        (status = 400, description = "Invalid poll id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Poll not found", body = ErrorSchema)
    ),
    tags = ["assist"],
    operation_id = "analyzePollResults"
)]
#[post("/polls/{id}/analysis")]
pub async fn analyze_results(
    state: web::Data<HttpState>,
    _caller: RequestIdentity,
    path: web::Path<String>,
) -> ApiResult<web::Json<AssistResponse<PollAnalysis>>> {
    let poll_id = parse_poll_id(&path)?;
    let outcome = state.assist.analyze_results(poll_id).await?;
    Ok(web::Json(outcome.into()))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::App;
    use actix_web::test as actix_test;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockPollAssist, MockPollsCommand, MockPollsQuery};
    use crate::domain::{Error, PollId};
    use crate::inbound::http::identity::IDENTITY_ID_HEADER;
    use crate::inbound::http::test_utils::test_state;

    async fn post_json(assist: MockPollAssist, uri: &str, body: Value) -> (StatusCode, Value) {
        let state = test_state(MockPollsCommand::new(), MockPollsQuery::new(), assist);
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").configure(crate::inbound::http::configure)),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri(uri)
                .insert_header((IDENTITY_ID_HEADER, "user_1"))
                .set_json(body)
                .to_request(),
        )
        .await;
        let status = res.status();
        (status, actix_test::read_body_json(res).await)
    }

    #[rstest]
    fn failures_serialise_without_data() {
        let body = serde_json::to_value(AssistResponse::<Vec<String>>::from(
            AssistOutcome::failure("Failed to generate poll options"),
        ))
        .expect("json");
        assert_eq!(
            body,
            json!({"success": false, "error": "Failed to generate poll options"})
        );
    }

    #[actix_web::test]
    async fn suggestions_are_tagged() {
        let mut assist = MockPollAssist::new();
        assist
            .expect_suggest_options()
            .withf(|topic| topic == "Lunch")
            .times(1)
            .return_once(|_| AssistOutcome::Success(vec!["Soup".into(), "Salad".into()]));

        let (status, body) =
            post_json(assist, "/api/v1/assist/options", json!({"topic": "Lunch"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": ["Soup", "Salad"]}));
    }

    #[actix_web::test]
    async fn analysis_failures_still_answer_ok() {
        let poll_id = PollId::random();
        let mut assist = MockPollAssist::new();
        assist
            .expect_analyze_results()
            .with(eq(poll_id))
            .times(1)
            .return_once(|_| Ok(AssistOutcome::failure("Failed to analyze poll results")));

        let (status, body) =
            post_json(assist, &format!("/api/v1/polls/{poll_id}/analysis"), json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("Failed to analyze poll results"));
    }

    #[actix_web::test]
    async fn missing_poll_is_not_found() {
        let mut assist = MockPollAssist::new();
        assist
            .expect_analyze_results()
            .return_once(|_| Err(Error::not_found("Poll not found")));

        let (status, body) = post_json(
            assist,
            &format!("/api/v1/polls/{}/analysis", PollId::random()),
            json!({}),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("not_found"));
    }
}
