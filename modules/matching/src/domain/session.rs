//! Session controller: a forward-only cursor over a queue snapshot.
//!
//! `Loading → Active → Exhausted`. The queue is fixed at start; each scoring
//! decision records one swipe and moves the cursor by one. A failed ledger
//! write leaves the cursor where it was.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{
    Decision, Gesture, Identity, Profile, SessionState, SessionView,
};
use crate::domain::error::DomainError;
use crate::domain::ledger::Ledger;

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    owner: Identity,
    state: SessionState,
    queue: Vec<Profile>,
    position: usize,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(owner: impl Into<Identity>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            state: SessionState::Loading,
            queue: Vec::new(),
            position: 0,
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// `Loading → Active`, or straight to `Exhausted` for an empty queue.
    pub fn start(&mut self, queue: Vec<Profile>) -> Result<(), DomainError> {
        if self.state != SessionState::Loading {
            return Err(DomainError::invalid_state(format!(
                "session already {}",
                self.state.as_str()
            )));
        }
        self.queue = queue;
        self.position = 0;
        self.state = if self.queue.is_empty() {
            SessionState::Exhausted
        } else {
            SessionState::Active
        };
        Ok(())
    }

    pub fn current(&self) -> Option<&Profile> {
        match self.state {
            SessionState::Active => self.queue.get(self.position),
            _ => None,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            owner: self.owner.clone(),
            state: self.state,
            position: self.position,
            total: self.queue.len(),
            current: self.current().cloned(),
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        if self.position >= self.queue.len() {
            self.state = SessionState::Exhausted;
        }
    }

    /// Apply one gesture. Non-scoring gestures are accepted and ignored.
    pub async fn decide(
        &mut self,
        ledger: &Ledger,
        gesture: Gesture,
    ) -> Result<Decision, DomainError> {
        if self.state != SessionState::Active {
            return Err(DomainError::invalid_state(format!(
                "decide requires an active session, session is {}",
                self.state.as_str()
            )));
        }
        if gesture.direction().is_none() {
            tracing::debug!(session = %self.id, ?gesture, "non-scoring gesture ignored");
            return Ok(Decision {
                outcome: None,
                session: self.view(),
            });
        }
        let target = match self.queue.get(self.position) {
            Some(p) => p.identity.clone(),
            None => return Err(DomainError::invalid_state("cursor is past the queue")),
        };

        let outcome = ledger.record_swipe(&self.owner, &target, gesture).await?;
        self.advance();
        Ok(Decision {
            outcome: Some(outcome),
            session: self.view(),
        })
    }
}
