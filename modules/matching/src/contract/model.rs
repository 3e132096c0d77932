use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

/// Verified, stable user identity (e.g. an e-mail) supplied by the identity provider.
pub type Identity = String;

/// One profile per identity. `avatar` is always derived from `photos[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub identity: Identity,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub gender: String,
    pub skills: Vec<String>,
    pub timezone: String,
    pub photos: Vec<String>,
    pub avatar: String,
    pub looking_for: Vec<String>,
    pub time_commitment: Option<String>,
    pub project_vibe: Option<String>,
    /// "Priority Match" flag, used by the boosted-first ordering.
    pub is_boosted: bool,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn empty(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            name: String::new(),
            birthday: None,
            gender: String::new(),
            skills: Vec::new(),
            timezone: String::new(),
            photos: Vec::new(),
            avatar: String::new(),
            looking_for: Vec::new(),
            time_commitment: None,
            project_vibe: None,
            is_boosted: false,
            updated_at: Utc::now(),
        }
    }

    /// First whitespace-separated word of the display name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Upsert input: `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Full replacement of the skill list.
    pub skills: Option<Vec<String>>,
    /// Applied after `skills`.
    pub skills_add: Vec<String>,
    pub skills_remove: Vec<String>,
    pub timezone: Option<String>,
    pub photos: Option<Vec<String>>,
    pub looking_for: Option<Vec<String>>,
    pub time_commitment: Option<String>,
    pub project_vibe: Option<String>,
    pub is_boosted: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Like,
    Pass,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Like => "like",
            Direction::Pass => "pass",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Swipe gesture as sent by clients.
///
/// `left`/`pass` and `right`/`like` score; `up` and `down` are recognized but
/// never reach the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Like,
    Pass,
    Up,
    Down,
}

impl Gesture {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Gesture::Like => Some(Direction::Like),
            Gesture::Pass => Some(Direction::Pass),
            Gesture::Up | Gesture::Down => None,
        }
    }
}

impl From<Direction> for Gesture {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Like => Gesture::Like,
            Direction::Pass => Gesture::Pass,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown swipe direction '{0}'")]
pub struct UnknownGesture(pub String);

impl FromStr for Gesture {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" | "right" => Ok(Gesture::Like),
            "pass" | "left" => Ok(Gesture::Pass),
            "up" => Ok(Gesture::Up),
            "down" => Ok(Gesture::Down),
            _ => Err(UnknownGesture(s.to_string())),
        }
    }
}

/// Immutable ledger entry; at most one per (actor, target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeRecord {
    pub actor: Identity,
    pub target: Identity,
    pub direction: Direction,
    pub at: DateTime<Utc>,
}

/// Result of a swipe. A replayed swipe yields the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeOutcome {
    pub record: SwipeRecord,
    /// The record is a like and the reverse like exists.
    pub matched: bool,
}

/// Result of a photo upload. `profile` is set only when the profile with the
/// new photo appended passed validation and was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub url: String,
    pub profile: Option<Profile>,
}

/// Lifecycle of a browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Active,
    Exhausted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Loading => "loading",
            SessionState::Active => "active",
            SessionState::Exhausted => "exhausted",
        }
    }
}

/// Snapshot of a session as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: uuid::Uuid,
    pub owner: Identity,
    pub state: SessionState,
    pub position: usize,
    pub total: usize,
    pub current: Option<Profile>,
}

/// Result of a session decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// `None` when the gesture was non-scoring and nothing was recorded.
    pub outcome: Option<SwipeOutcome>,
    pub session: SessionView,
}
