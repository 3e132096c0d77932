use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    Decision, PhotoUpload, Profile, ProfileInput, SessionView, SwipeOutcome,
};

/// REST DTO for a profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub identity: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub gender: String,
    pub skills: Vec<String>,
    pub timezone: String,
    pub photos: Vec<String>,
    /// Always the first photo, or empty.
    pub avatar: String,
    pub looking_for: Vec<String>,
    pub time_commitment: Option<String>,
    pub project_vibe: Option<String>,
    pub is_boosted: bool,
    pub updated_at: DateTime<Utc>,
}

/// Profile upsert. Absent fields keep their stored value; `avatar` is derived
/// and therefore not accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SaveProfileReq {
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub gender: Option<String>,
    pub skills: Option<Vec<String>>,
    pub skills_add: Vec<String>,
    pub skills_remove: Vec<String>,
    pub timezone: Option<String>,
    pub photos: Option<Vec<String>>,
    pub looking_for: Option<Vec<String>>,
    pub time_commitment: Option<String>,
    pub project_vibe: Option<String>,
    pub is_boosted: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUploadDto {
    pub url: String,
    /// Saved profile, or `null` while the profile is still incomplete.
    pub profile: Option<ProfileDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileListDto {
    pub profiles: Vec<ProfileDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwipeReq {
    pub target: String,
    /// `like`/`right` or `pass`/`left`.
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwipeOutcomeDto {
    pub actor: String,
    pub target: String,
    pub direction: String,
    pub at: DateTime<Utc>,
    pub matched: bool,
}

/// Likes grid entry: no surname, no identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LikeCardDto {
    pub first_name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LikesDto {
    pub likes: Vec<LikeCardDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchDto {
    pub identity: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchesDto {
    pub matches: Vec<MatchDto>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: Uuid,
    /// `loading`, `active` or `exhausted`.
    pub state: String,
    pub position: usize,
    pub total: usize,
    /// Candidate at the cursor; `null` once exhausted.
    pub current: Option<ProfileDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecideReq {
    /// `like`/`right`, `pass`/`left`, or the non-scoring `up`/`down`.
    pub direction: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecisionDto {
    /// `null` when the gesture was ignored.
    pub outcome: Option<SwipeOutcomeDto>,
    pub session: SessionDto,
}

// Conversion implementations between REST DTOs and contract models

impl From<Profile> for ProfileDto {
    fn from(p: Profile) -> Self {
        Self {
            identity: p.identity,
            name: p.name,
            birthday: p.birthday,
            gender: p.gender,
            skills: p.skills,
            timezone: p.timezone,
            photos: p.photos,
            avatar: p.avatar,
            looking_for: p.looking_for,
            time_commitment: p.time_commitment,
            project_vibe: p.project_vibe,
            is_boosted: p.is_boosted,
            updated_at: p.updated_at,
        }
    }
}

impl From<SaveProfileReq> for ProfileInput {
    fn from(req: SaveProfileReq) -> Self {
        Self {
            name: req.name,
            birthday: req.birthday,
            gender: req.gender,
            skills: req.skills,
            skills_add: req.skills_add,
            skills_remove: req.skills_remove,
            timezone: req.timezone,
            photos: req.photos,
            looking_for: req.looking_for,
            time_commitment: req.time_commitment,
            project_vibe: req.project_vibe,
            is_boosted: req.is_boosted,
        }
    }
}

impl From<PhotoUpload> for PhotoUploadDto {
    fn from(u: PhotoUpload) -> Self {
        Self {
            url: u.url,
            profile: u.profile.map(ProfileDto::from),
        }
    }
}

impl From<Vec<Profile>> for ProfileListDto {
    fn from(profiles: Vec<Profile>) -> Self {
        let profiles: Vec<ProfileDto> = profiles.into_iter().map(ProfileDto::from).collect();
        Self {
            total: profiles.len(),
            profiles,
        }
    }
}

impl From<SwipeOutcome> for SwipeOutcomeDto {
    fn from(o: SwipeOutcome) -> Self {
        Self {
            actor: o.record.actor,
            target: o.record.target,
            direction: o.record.direction.to_string(),
            at: o.record.at,
            matched: o.matched,
        }
    }
}

impl From<&Profile> for LikeCardDto {
    fn from(p: &Profile) -> Self {
        Self {
            first_name: p.first_name().to_string(),
            avatar: p.avatar.clone(),
        }
    }
}

impl From<Vec<Profile>> for LikesDto {
    fn from(profiles: Vec<Profile>) -> Self {
        let likes: Vec<LikeCardDto> = profiles.iter().map(LikeCardDto::from).collect();
        Self {
            total: likes.len(),
            likes,
        }
    }
}

impl From<Profile> for MatchDto {
    fn from(p: Profile) -> Self {
        Self {
            identity: p.identity,
            name: p.name,
            avatar: p.avatar,
        }
    }
}

impl From<Vec<Profile>> for MatchesDto {
    fn from(profiles: Vec<Profile>) -> Self {
        let matches: Vec<MatchDto> = profiles.into_iter().map(MatchDto::from).collect();
        Self {
            total: matches.len(),
            matches,
        }
    }
}

impl From<SessionView> for SessionDto {
    fn from(v: SessionView) -> Self {
        Self {
            id: v.id,
            state: v.state.as_str().to_string(),
            position: v.position,
            total: v.total,
            current: v.current.map(ProfileDto::from),
        }
    }
}

impl From<Decision> for DecisionDto {
    fn from(d: Decision) -> Self {
        Self {
            outcome: d.outcome.map(SwipeOutcomeDto::from),
            session: SessionDto::from(d.session),
        }
    }
}
