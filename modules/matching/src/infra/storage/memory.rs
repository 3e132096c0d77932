//! In-process storage adapters for the profile store and swipe ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use parking_lot::RwLock;

use crate::contract::model::{Identity, Profile, SwipeRecord};
use crate::domain::ports::CandidateSource;
use crate::domain::repo::{ProfileRepository, SwipeRepository};

#[derive(Default)]
struct ProfileRows {
    index: HashMap<Identity, usize>,
    rows: Vec<Profile>,
}

/// Profiles kept in first-insertion order.
#[derive(Default)]
pub struct InMemoryProfileRepository {
    inner: RwLock<ProfileRows>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find(&self, identity: &str) -> anyhow::Result<Option<Profile>> {
        let inner = self.inner.read();
        Ok(inner.index.get(identity).map(|&i| inner.rows[i].clone()))
    }

    async fn upsert(&self, profile: Profile) -> anyhow::Result<()> {
        let mut inner = self.inner.write();
        match inner.index.get(&profile.identity).copied() {
            Some(i) => inner.rows[i] = profile,
            None => {
                let i = inner.rows.len();
                inner.index.insert(profile.identity.clone(), i);
                inner.rows.push(profile);
            }
        }
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<Profile>> {
        Ok(self.inner.read().rows.clone())
    }
}

#[async_trait]
impl CandidateSource for InMemoryProfileRepository {
    async fn all_profiles(&self) -> anyhow::Result<Vec<Profile>> {
        self.list().await
    }
}

/// Ledger keyed by (actor, target) with per-actor and per-target indexes.
#[derive(Default)]
pub struct InMemorySwipeRepository {
    by_pair: DashMap<(Identity, Identity), SwipeRecord>,
    by_actor: DashMap<Identity, Vec<Identity>>,
    by_target: DashMap<Identity, Vec<Identity>>,
}

impl InMemorySwipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_pair.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }

    fn records<'a>(&self, keys: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<SwipeRecord> {
        keys.filter_map(|(a, t)| {
            self.by_pair
                .get(&(a.to_string(), t.to_string()))
                .map(|r| r.value().clone())
        })
        .collect()
    }
}

#[async_trait]
impl SwipeRepository for InMemorySwipeRepository {
    async fn append_if_absent(&self, record: SwipeRecord) -> anyhow::Result<SwipeRecord> {
        let key = (record.actor.clone(), record.target.clone());
        // The entry guard serializes writers of the same pair.
        match self.by_pair.entry(key) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => {
                let stored = slot.insert(record).value().clone();
                self.by_actor
                    .entry(stored.actor.clone())
                    .or_default()
                    .push(stored.target.clone());
                self.by_target
                    .entry(stored.target.clone())
                    .or_default()
                    .push(stored.actor.clone());
                Ok(stored)
            }
        }
    }

    async fn find(&self, actor: &str, target: &str) -> anyhow::Result<Option<SwipeRecord>> {
        Ok(self
            .by_pair
            .get(&(actor.to_string(), target.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn by_actor(&self, actor: &str) -> anyhow::Result<Vec<SwipeRecord>> {
        let targets = self
            .by_actor
            .get(actor)
            .map(|v| v.value().clone())
            .unwrap_or_default();
        Ok(self.records(targets.iter().map(|t| (actor, t.as_str()))))
    }

    async fn by_target(&self, target: &str) -> anyhow::Result<Vec<SwipeRecord>> {
        let actors = self
            .by_target
            .get(target)
            .map(|v| v.value().clone())
            .unwrap_or_default();
        Ok(self.records(actors.iter().map(|a| (a.as_str(), target))))
    }
}
