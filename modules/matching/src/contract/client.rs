use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::MatchingError,
    model::{
        Decision, Gesture, Identity, PhotoUpload, Profile, ProfileInput, SessionView,
        SwipeOutcome,
    },
};

/// Public API trait for the matching module that other modules can use
#[async_trait]
pub trait MatchingApi: Send + Sync {
    /// Own profile, `None` when the identity never saved one.
    async fn get_profile(&self, identity: &str) -> Result<Option<Profile>, MatchingError>;

    /// Upsert: merge `input` over the stored record and validate.
    async fn save_profile(
        &self,
        identity: &str,
        input: ProfileInput,
    ) -> Result<Profile, MatchingError>;

    async fn attach_photo(
        &self,
        identity: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUpload, MatchingError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, MatchingError>;

    /// Ordered swipeable candidates for `requester`.
    async fn candidate_queue(&self, requester: &str) -> Result<Vec<Profile>, MatchingError>;

    async fn record_swipe(
        &self,
        actor: &str,
        target: &str,
        gesture: Gesture,
    ) -> Result<SwipeOutcome, MatchingError>;

    /// Actors who liked `identity`, mutual matches excluded.
    async fn likes_received_by(&self, identity: &str) -> Result<Vec<Identity>, MatchingError>;

    async fn matches_of(&self, identity: &str) -> Result<Vec<Identity>, MatchingError>;

    async fn is_match(&self, a: &str, b: &str) -> Result<bool, MatchingError>;

    /// Start a session; replaces any previous session of `requester`.
    async fn start_session(&self, requester: &str) -> Result<SessionView, MatchingError>;

    async fn current(&self, owner: &str, session: Uuid) -> Result<SessionView, MatchingError>;

    async fn decide(
        &self,
        owner: &str,
        session: Uuid,
        gesture: Gesture,
    ) -> Result<Decision, MatchingError>;

    async fn end_session(&self, owner: &str, session: Uuid) -> Result<(), MatchingError>;
}
