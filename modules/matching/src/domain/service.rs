use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{
    Decision, Gesture, Identity, PhotoUpload, Profile, ProfileInput, SessionView, SwipeOutcome,
};
use crate::domain::error::{rule, DomainError};
use crate::domain::ledger::Ledger;
use crate::domain::ports::{BlobStorage, CandidateSource};
use crate::domain::profile_store::ProfileRules;
use crate::domain::queue::{CandidateOrder, QueueBuilder};
use crate::domain::repo::{ProfileRepository, SwipeRepository};
use crate::domain::session::Session;

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub rules: ProfileRules,
    /// Upper bound on live sessions; the oldest is evicted past it.
    pub max_sessions: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            rules: ProfileRules::default(),
            max_sessions: 10_000,
        }
    }
}

#[derive(Clone)]
struct SessionSlot {
    owner: Identity,
    started_at: DateTime<Utc>,
    session: Arc<Mutex<Session>>,
}

/// Domain service for the matching engine.
/// Depends only on ports, not on infra types.
pub struct Service {
    profiles: Arc<dyn ProfileRepository>,
    source: Arc<dyn CandidateSource>,
    blobs: Arc<dyn BlobStorage>,
    ledger: Ledger,
    queue: QueueBuilder,
    config: ServiceConfig,
    sessions: DashMap<Uuid, SessionSlot>,
    session_by_owner: DashMap<Identity, Uuid>,
    // Serializes read-merge-write per identity
    write_locks: DashMap<Identity, Arc<Mutex<()>>>,
    photo_seq: DashMap<Identity, u32>,
}

fn storage(e: anyhow::Error) -> DomainError {
    DomainError::storage(e.to_string())
}

impl Service {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        source: Arc<dyn CandidateSource>,
        swipes: Arc<dyn SwipeRepository>,
        blobs: Arc<dyn BlobStorage>,
        order: Arc<dyn CandidateOrder>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            profiles,
            source,
            blobs,
            ledger: Ledger::new(swipes),
            queue: QueueBuilder::new(config.rules, order),
            config,
            sessions: DashMap::new(),
            session_by_owner: DashMap::new(),
            write_locks: DashMap::new(),
            photo_seq: DashMap::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn write_lock(&self, identity: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .entry(identity.to_string())
            .or_default()
            .clone()
    }

    // ---- Profile Store ----

    #[instrument(name = "matching.service.get_profile", skip(self), fields(identity = %identity))]
    pub async fn get_profile(&self, identity: &str) -> Result<Option<Profile>, DomainError> {
        debug!("Getting profile");
        self.profiles.find(identity).await.map_err(storage)
    }

    #[instrument(name = "matching.service.save_profile", skip(self, input), fields(identity = %identity))]
    pub async fn save_profile(
        &self,
        identity: &str,
        input: ProfileInput,
    ) -> Result<Profile, DomainError> {
        let lock = self.write_lock(identity);
        let _guard = lock.lock().await;

        let existing = self.profiles.find(identity).await.map_err(storage)?;
        let created = existing.is_none();
        let profile = self.config.rules.merge(identity, existing, input)?;
        self.profiles
            .upsert(profile.clone())
            .await
            .map_err(storage)?;

        info!(created, photos = profile.photos.len(), "Profile saved");
        Ok(profile)
    }

    /// Store photo bytes and append the URL to the profile.
    ///
    /// The profile is written only if it validates with the new photo; the
    /// URL is returned either way.
    #[instrument(
        name = "matching.service.attach_photo",
        skip(self, bytes),
        fields(identity = %identity, size = bytes.len())
    )]
    pub async fn attach_photo(
        &self,
        identity: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUpload, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::validation(rule::PHOTO_EMPTY, "photo is empty"));
        }
        let lock = self.write_lock(identity);
        let _guard = lock.lock().await;

        let existing = self.profiles.find(identity).await.map_err(storage)?;
        let mut photos = existing
            .as_ref()
            .map(|p| p.photos.clone())
            .unwrap_or_default();
        if photos.len() >= self.config.rules.max_photos {
            return Err(DomainError::validation(
                rule::PHOTO_COUNT,
                format!("at most {} photos are allowed", self.config.rules.max_photos),
            ));
        }

        let seq = self.next_photo_seq(identity, photos.len());
        let url = self
            .blobs
            .put(identity, seq, bytes)
            .await
            .map_err(storage)?;
        photos.push(url.clone());

        let input = ProfileInput {
            photos: Some(photos),
            ..Default::default()
        };
        let profile = match self.config.rules.merge(identity, existing, input) {
            Ok(p) => {
                self.profiles.upsert(p.clone()).await.map_err(storage)?;
                info!(seq, "Photo attached to profile");
                Some(p)
            }
            Err(DomainError::Validation { rule, .. }) => {
                debug!(seq, rule, "Photo stored; profile not yet valid");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(PhotoUpload { url, profile })
    }

    fn next_photo_seq(&self, identity: &str, floor: usize) -> u32 {
        let floor = u32::try_from(floor).unwrap_or(u32::MAX);
        let mut next = self.photo_seq.entry(identity.to_string()).or_insert(floor);
        let seq = (*next).max(floor);
        *next = seq.saturating_add(1);
        seq
    }

    #[instrument(name = "matching.service.list_profiles", skip(self))]
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.source.all_profiles().await.map_err(storage)?;
        debug!(count = profiles.len(), "Listed profiles");
        Ok(profiles)
    }

    /// Profiles for `ids` in the given order; unknown identities are skipped.
    pub async fn profiles_of(&self, ids: &[Identity]) -> Result<Vec<Profile>, DomainError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(p) = self.profiles.find(id).await.map_err(storage)? {
                out.push(p);
            }
        }
        Ok(out)
    }

    // ---- Candidate queue & ledger ----

    #[instrument(name = "matching.service.candidate_queue", skip(self), fields(requester = %requester))]
    pub async fn candidate_queue(&self, requester: &str) -> Result<Vec<Profile>, DomainError> {
        let all = self.source.all_profiles().await.map_err(storage)?;
        let decided = self.ledger.decided_targets(requester).await?;
        let queue = self.queue.build(requester, all, &decided);
        debug!(candidates = queue.len(), decided = decided.len(), "Built candidate queue");
        Ok(queue)
    }

    #[instrument(
        name = "matching.service.record_swipe",
        skip(self),
        fields(actor = %actor, target = %target)
    )]
    pub async fn record_swipe(
        &self,
        actor: &str,
        target: &str,
        gesture: Gesture,
    ) -> Result<SwipeOutcome, DomainError> {
        let outcome = self.ledger.record_swipe(actor, target, gesture).await?;
        info!(
            direction = %outcome.record.direction,
            matched = outcome.matched,
            "Swipe recorded"
        );
        Ok(outcome)
    }

    #[instrument(name = "matching.service.likes_received_by", skip(self), fields(identity = %identity))]
    pub async fn likes_received_by(&self, identity: &str) -> Result<Vec<Identity>, DomainError> {
        self.ledger.likes_received_by(identity).await
    }

    #[instrument(name = "matching.service.matches_of", skip(self), fields(identity = %identity))]
    pub async fn matches_of(&self, identity: &str) -> Result<Vec<Identity>, DomainError> {
        self.ledger.matches_of(identity).await
    }

    pub async fn is_match(&self, a: &str, b: &str) -> Result<bool, DomainError> {
        self.ledger.is_match(a, b).await
    }

    // ---- Sessions ----

    /// Start a browsing session; the requester's previous session is dropped.
    #[instrument(name = "matching.service.start_session", skip(self), fields(requester = %requester))]
    pub async fn start_session(&self, requester: &str) -> Result<SessionView, DomainError> {
        let mut session = Session::new(requester);
        let queue = self.candidate_queue(requester).await?;
        session.start(queue)?;
        let view = session.view();

        // Replacing the requester's own session frees its slot before the limit applies
        if let Some((_, previous)) = self.session_by_owner.remove(requester) {
            self.sessions.remove(&previous);
            debug!(%previous, "Replaced previous session");
        }
        self.evict_if_full();
        self.sessions.insert(
            view.id,
            SessionSlot {
                owner: requester.to_string(),
                started_at: session.started_at(),
                session: Arc::new(Mutex::new(session)),
            },
        );
        self.session_by_owner.insert(requester.to_string(), view.id);

        info!(
            session = %view.id,
            total = view.total,
            state = view.state.as_str(),
            "Session started"
        );
        Ok(view)
    }

    fn evict_if_full(&self) {
        if self.sessions.len() < self.config.max_sessions {
            return;
        }
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|e| e.value().started_at)
            .map(|e| (*e.key(), e.value().owner.clone()));
        if let Some((id, owner)) = oldest {
            self.sessions.remove(&id);
            self.session_by_owner.remove_if(&owner, |_, v| *v == id);
            warn!(session = %id, "Session limit reached, evicted oldest session");
        }
    }

    fn session(&self, owner: &str, id: Uuid) -> Result<Arc<Mutex<Session>>, DomainError> {
        match self.sessions.get(&id) {
            Some(slot) if slot.owner == owner => Ok(slot.session.clone()),
            _ => Err(DomainError::session_not_found(id)),
        }
    }

    #[instrument(name = "matching.service.current", skip(self), fields(owner = %owner, session = %id))]
    pub async fn current(&self, owner: &str, id: Uuid) -> Result<SessionView, DomainError> {
        let session = self.session(owner, id)?;
        let view = session.lock().await.view();
        Ok(view)
    }

    #[instrument(name = "matching.service.decide", skip(self), fields(owner = %owner, session = %id))]
    pub async fn decide(
        &self,
        owner: &str,
        id: Uuid,
        gesture: Gesture,
    ) -> Result<Decision, DomainError> {
        let session = self.session(owner, id)?;
        let mut session = session.lock().await;
        let decision = session.decide(&self.ledger, gesture).await?;
        debug!(
            position = decision.session.position,
            state = decision.session.state.as_str(),
            "Decision applied"
        );
        Ok(decision)
    }

    #[instrument(name = "matching.service.end_session", skip(self), fields(owner = %owner, session = %id))]
    pub async fn end_session(&self, owner: &str, id: Uuid) -> Result<(), DomainError> {
        self.session(owner, id)?;
        self.sessions.remove(&id);
        self.session_by_owner.remove_if(owner, |_, v| *v == id);
        info!("Session ended");
        Ok(())
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }
}
