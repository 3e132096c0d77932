pub mod client;
pub mod error;
pub mod model;

pub use client::MatchingApi;
pub use error::MatchingError;
pub use model::{
    Decision, Direction, Gesture, Identity, PhotoUpload, Profile, ProfileInput, SessionState,
    SessionView, SwipeOutcome, SwipeRecord,
};
