use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::MatchingApi,
    error::MatchingError,
    model::{
        Decision, Gesture, Identity, PhotoUpload, Profile, ProfileInput, SessionView,
        SwipeOutcome,
    },
};
use crate::domain::service::Service;

/// Local implementation of the MatchingApi trait that delegates to the domain service
pub struct MatchingLocalClient {
    service: Arc<Service>,
}

impl MatchingLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl MatchingApi for MatchingLocalClient {
    async fn get_profile(&self, identity: &str) -> Result<Option<Profile>, MatchingError> {
        self.service.get_profile(identity).await.map_err(Into::into)
    }

    async fn save_profile(
        &self,
        identity: &str,
        input: ProfileInput,
    ) -> Result<Profile, MatchingError> {
        self.service
            .save_profile(identity, input)
            .await
            .map_err(Into::into)
    }

    async fn attach_photo(
        &self,
        identity: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUpload, MatchingError> {
        self.service
            .attach_photo(identity, bytes)
            .await
            .map_err(Into::into)
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, MatchingError> {
        self.service.list_profiles().await.map_err(Into::into)
    }

    async fn candidate_queue(&self, requester: &str) -> Result<Vec<Profile>, MatchingError> {
        self.service
            .candidate_queue(requester)
            .await
            .map_err(Into::into)
    }

    async fn record_swipe(
        &self,
        actor: &str,
        target: &str,
        gesture: Gesture,
    ) -> Result<SwipeOutcome, MatchingError> {
        self.service
            .record_swipe(actor, target, gesture)
            .await
            .map_err(Into::into)
    }

    async fn likes_received_by(&self, identity: &str) -> Result<Vec<Identity>, MatchingError> {
        self.service
            .likes_received_by(identity)
            .await
            .map_err(Into::into)
    }

    async fn matches_of(&self, identity: &str) -> Result<Vec<Identity>, MatchingError> {
        self.service.matches_of(identity).await.map_err(Into::into)
    }

    async fn is_match(&self, a: &str, b: &str) -> Result<bool, MatchingError> {
        self.service.is_match(a, b).await.map_err(Into::into)
    }

    async fn start_session(&self, requester: &str) -> Result<SessionView, MatchingError> {
        self.service
            .start_session(requester)
            .await
            .map_err(Into::into)
    }

    async fn current(&self, owner: &str, session: Uuid) -> Result<SessionView, MatchingError> {
        self.service
            .current(owner, session)
            .await
            .map_err(Into::into)
    }

    async fn decide(
        &self,
        owner: &str,
        session: Uuid,
        gesture: Gesture,
    ) -> Result<Decision, MatchingError> {
        self.service
            .decide(owner, session, gesture)
            .await
            .map_err(Into::into)
    }

    async fn end_session(&self, owner: &str, session: Uuid) -> Result<(), MatchingError> {
        self.service
            .end_session(owner, session)
            .await
            .map_err(Into::into)
    }
}
