//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint, the schemas they reference and
//! the gateway identity header as the security scheme. Swagger UI serves it
//! in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{
    CreatePollRequest, DashboardStats, PollResults, PollView, PopularPoll,
};
use crate::domain::{
    Poll, PollAnalysis, PollStatus, PollSummary, Tally, Vote, VoteHistoryEntry, VoterDetail,
};
use crate::inbound::http::assist::SuggestOptionsRequest;
use crate::inbound::http::polls::CastVoteRequest;
use crate::inbound::http::schemas::{
    AnalysisResponseSchema, ErrorCodeSchema, ErrorSchema, SuggestOptionsResponseSchema,
};

/// Adds the gateway identity header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "IdentityHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Identity-Id",
                "Caller identity forwarded by the identity provider's gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Livepoll API",
        description = "Create polls, vote, follow results and ask for generated suggestions."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::polls::create_poll,
        crate::inbound::http::polls::list_public_polls,
        crate::inbound::http::polls::get_poll,
        crate::inbound::http::polls::cast_vote,
        crate::inbound::http::polls::poll_results,
        crate::inbound::http::polls::voter_details,
        crate::inbound::http::assist::suggest_options,
        crate::inbound::http::assist::analyze_results,
        crate::inbound::http::me::user_polls,
        crate::inbound::http::me::vote_history,
        crate::inbound::http::me::dashboard_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Poll,
        PollView,
        PollStatus,
        PollAnalysis,
        PollResults,
        PollSummary,
        Tally,
        Vote,
        VoteHistoryEntry,
        VoterDetail,
        DashboardStats,
        PopularPoll,
        CreatePollRequest,
        CastVoteRequest,
        SuggestOptionsRequest,
        SuggestOptionsResponseSchema,
        AnalysisResponseSchema,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "polls", description = "Polls, votes and results"),
        (name = "assist", description = "Generated option suggestions and analysis"),
        (name = "me", description = "Views scoped to the caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/polls",
            "/api/v1/polls/public",
            "/api/v1/polls/{id}",
            "/api/v1/polls/{id}/votes",
            "/api/v1/polls/{id}/results",
            "/api/v1/polls/{id}/voters",
            "/api/v1/polls/{id}/analysis",
            "/api/v1/assist/options",
            "/api/v1/me/polls",
            "/api/v1/me/votes",
            "/api/v1/me/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("crate.domain.Error"));
    }

    #[test]
    fn identity_header_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("IdentityHeader"));
    }
}
