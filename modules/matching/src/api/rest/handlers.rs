use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use modkit::ProblemResponse;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::dto::{
    DecideReq, DecisionDto, LikesDto, MatchesDto, PhotoUploadDto, ProfileDto, ProfileListDto,
    SaveProfileReq, SessionDto, SwipeOutcomeDto, SwipeReq,
};
use crate::api::rest::error::map_domain_error;
use crate::api::rest::identity::VerifiedIdentity;
use crate::contract::model::Gesture;
use crate::domain::error::DomainError;
use crate::domain::service::Service;

type ApiResult<T> = Result<T, ProblemResponse>;

fn parse_gesture(direction: &str) -> Result<Gesture, DomainError> {
    direction
        .parse::<Gesture>()
        .map_err(|e| DomainError::invalid_operation(e.to_string()))
}

/// Get the caller's profile
pub async fn get_profile(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
) -> ApiResult<Json<ProfileDto>> {
    match svc.get_profile(me.as_str()).await {
        Ok(Some(profile)) => Ok(Json(ProfileDto::from(profile))),
        Ok(None) => Err(map_domain_error(
            &DomainError::profile_not_found(me.as_str()),
            uri.path(),
        )),
        Err(e) => Err(map_domain_error(&e, uri.path())),
    }
}

/// Upsert the caller's profile
pub async fn save_profile(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    Json(req): Json<SaveProfileReq>,
) -> ApiResult<Json<ProfileDto>> {
    info!(identity = %me.as_str(), "Saving profile");
    svc.save_profile(me.as_str(), req.into())
        .await
        .map(|p| Json(ProfileDto::from(p)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Store raw photo bytes and append the photo to the caller's profile
pub async fn upload_photo(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<PhotoUploadDto>)> {
    svc.attach_photo(me.as_str(), body.to_vec())
        .await
        .map(|u| (StatusCode::CREATED, Json(PhotoUploadDto::from(u))))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// List every stored profile
pub async fn list_profiles(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    _me: VerifiedIdentity,
) -> ApiResult<Json<ProfileListDto>> {
    svc.list_profiles()
        .await
        .map(|p| Json(ProfileListDto::from(p)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Candidate queue for the caller
pub async fn list_candidates(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
) -> ApiResult<Json<ProfileListDto>> {
    svc.candidate_queue(me.as_str())
        .await
        .map(|p| Json(ProfileListDto::from(p)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Record a swipe outside of a session
pub async fn record_swipe(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    Json(req): Json<SwipeReq>,
) -> ApiResult<Json<SwipeOutcomeDto>> {
    let gesture = parse_gesture(&req.direction).map_err(|e| map_domain_error(&e, uri.path()))?;
    svc.record_swipe(me.as_str(), req.target.trim(), gesture)
        .await
        .map(|o| Json(SwipeOutcomeDto::from(o)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Who liked the caller, matches excluded
pub async fn list_likes(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
) -> ApiResult<Json<LikesDto>> {
    let result = async {
        let ids = svc.likes_received_by(me.as_str()).await?;
        svc.profiles_of(&ids).await
    }
    .await;
    result
        .map(|p| Json(LikesDto::from(p)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Mutual matches of the caller
pub async fn list_matches(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
) -> ApiResult<Json<MatchesDto>> {
    let result = async {
        let ids = svc.matches_of(me.as_str()).await?;
        svc.profiles_of(&ids).await
    }
    .await;
    result
        .map(|p| Json(MatchesDto::from(p)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Start a browsing session
pub async fn start_session(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
) -> ApiResult<(StatusCode, Json<SessionDto>)> {
    svc.start_session(me.as_str())
        .await
        .map(|v| (StatusCode::CREATED, Json(SessionDto::from(v))))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Current candidate of a session
pub async fn current_candidate(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionDto>> {
    svc.current(me.as_str(), id)
        .await
        .map(|v| Json(SessionDto::from(v)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// Decide on the current candidate
pub async fn decide(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    Path(id): Path<Uuid>,
    Json(req): Json<DecideReq>,
) -> ApiResult<Json<DecisionDto>> {
    let gesture = parse_gesture(&req.direction).map_err(|e| map_domain_error(&e, uri.path()))?;
    svc.decide(me.as_str(), id, gesture)
        .await
        .map(|d| Json(DecisionDto::from(d)))
        .map_err(|e| map_domain_error(&e, uri.path()))
}

/// End a session
pub async fn end_session(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    me: VerifiedIdentity,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    svc.end_session(me.as_str(), id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| map_domain_error(&e, uri.path()))
}
