use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::identity::VERIFIED_IDENTITY_HEADER;
use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub const BASE_PATH: &str = "/matching/v1";

fn path(suffix: &str) -> String {
    format!("{BASE_PATH}{suffix}")
}

fn op(
    b: OperationBuilder<Missing, Missing, ()>,
    id: &str,
    summary: &str,
    tag: &str,
) -> OperationBuilder<Missing, Missing, ()> {
    b.operation_id(format!("matching.{id}"))
        .summary(summary)
        .tag(tag)
        .header_param(VERIFIED_IDENTITY_HEADER, true, "Verified caller identity")
}

/// Register the matching routes on `router` and describe them in `openapi`.
pub fn register_routes(
    router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    let mut routes = Router::new();

    // GET /matching/v1/profile - Get own profile
    routes = op(
        OperationBuilder::get(path("/profile")),
        "get_profile",
        "Get own profile",
        "profiles",
    )
    .handler(handlers::get_profile)
    .json_response_with_schema::<dto::ProfileDto>(openapi, 200, "Profile found")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 404, "Not Found")
    .register(routes, openapi);

    // POST /matching/v1/profile - Upsert own profile
    routes = op(
        OperationBuilder::post(path("/profile")),
        "save_profile",
        "Save own profile",
        "profiles",
    )
    .description("Merge the input over the stored profile and validate the result")
    .json_request::<dto::SaveProfileReq>(openapi, "Profile fields to change")
    .handler(handlers::save_profile)
    .json_response_with_schema::<dto::ProfileDto>(openapi, 200, "Saved profile")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 422, "Validation failed")
    .problem_response(openapi, 500, "Internal Server Error")
    .register(routes, openapi);

    // POST /matching/v1/profile/photos - Attach a photo
    routes = op(
        OperationBuilder::post(path("/profile/photos")),
        "upload_photo",
        "Upload a photo",
        "profiles",
    )
    .raw_request("application/octet-stream", "Raw image bytes")
    .handler(handlers::upload_photo)
    .json_response_with_schema::<dto::PhotoUploadDto>(openapi, 201, "Photo stored")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 422, "Validation failed")
    .problem_response(openapi, 500, "Internal Server Error")
    .register(routes, openapi);

    // GET /matching/v1/profiles - All profiles
    routes = op(
        OperationBuilder::get(path("/profiles")),
        "list_profiles",
        "List all profiles",
        "profiles",
    )
    .handler(handlers::list_profiles)
    .json_response_with_schema::<dto::ProfileListDto>(openapi, 200, "All profiles")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // GET /matching/v1/candidates - Candidate queue
    routes = op(
        OperationBuilder::get(path("/candidates")),
        "list_candidates",
        "Candidate queue",
        "matching",
    )
    .description("Complete profiles the caller has not decided on yet, in queue order")
    .handler(handlers::list_candidates)
    .json_response_with_schema::<dto::ProfileListDto>(openapi, 200, "Candidates")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // POST /matching/v1/swipes - Record a swipe
    routes = op(
        OperationBuilder::post(path("/swipes")),
        "record_swipe",
        "Record a swipe",
        "matching",
    )
    .description("Idempotent per (caller, target): a repeated swipe returns the stored one")
    .json_request::<dto::SwipeReq>(openapi, "Target and direction")
    .handler(handlers::record_swipe)
    .json_response_with_schema::<dto::SwipeOutcomeDto>(openapi, 200, "Swipe outcome")
    .problem_response(openapi, 400, "Invalid operation")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // GET /matching/v1/likes - Likes received
    routes = op(
        OperationBuilder::get(path("/likes")),
        "list_likes",
        "Likes received",
        "matching",
    )
    .description("People who liked the caller, excluding mutual matches")
    .handler(handlers::list_likes)
    .json_response_with_schema::<dto::LikesDto>(openapi, 200, "Likes")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // GET /matching/v1/matches - Mutual matches
    routes = op(
        OperationBuilder::get(path("/matches")),
        "list_matches",
        "Mutual matches",
        "matching",
    )
    .handler(handlers::list_matches)
    .json_response_with_schema::<dto::MatchesDto>(openapi, 200, "Matches")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // POST /matching/v1/sessions - Start a session
    routes = op(
        OperationBuilder::post(path("/sessions")),
        "start_session",
        "Start a browsing session",
        "sessions",
    )
    .description("Snapshots the candidate queue; replaces the caller's previous session")
    .handler(handlers::start_session)
    .json_response_with_schema::<dto::SessionDto>(openapi, 201, "Session started")
    .problem_response(openapi, 401, "Unauthorized")
    .register(routes, openapi);

    // GET /matching/v1/sessions/{id}/current - Current candidate
    routes = op(
        OperationBuilder::get(path("/sessions/{id}/current")),
        "current_candidate",
        "Current candidate",
        "sessions",
    )
    .path_param("id", "Session UUID")
    .handler(handlers::current_candidate)
    .json_response_with_schema::<dto::SessionDto>(openapi, 200, "Session view")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 404, "Not Found")
    .register(routes, openapi);

    // POST /matching/v1/sessions/{id}/decide - Decide on the current candidate
    routes = op(
        OperationBuilder::post(path("/sessions/{id}/decide")),
        "decide",
        "Decide on the current candidate",
        "sessions",
    )
    .path_param("id", "Session UUID")
    .json_request::<dto::DecideReq>(openapi, "Gesture")
    .handler(handlers::decide)
    .json_response_with_schema::<dto::DecisionDto>(openapi, 200, "Decision applied")
    .problem_response(openapi, 400, "Invalid operation")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 404, "Not Found")
    .problem_response(openapi, 409, "Session is not active")
    .register(routes, openapi);

    // DELETE /matching/v1/sessions/{id} - End a session
    routes = op(
        OperationBuilder::delete(path("/sessions/{id}")),
        "end_session",
        "End a session",
        "sessions",
    )
    .path_param("id", "Session UUID")
    .handler(handlers::end_session)
    .empty_response(204, "Session ended")
    .problem_response(openapi, 401, "Unauthorized")
    .problem_response(openapi, 404, "Not Found")
    .register(routes, openapi);

    // The service extension stays scoped to the matching routes
    Ok(router.merge(routes.layer(Extension(service))))
}
