#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use matching::config::MatchingConfig;
use matching::contract::model::ProfileInput;
use matching::domain::service::Service;
use matching::module::build_service;

pub fn service() -> Arc<Service> {
    service_with(MatchingConfig::default())
}

pub fn service_with(cfg: MatchingConfig) -> Arc<Service> {
    match build_service(&cfg) {
        Ok(s) => Arc::new(s),
        Err(e) => panic!("failed to build service: {e:#}"),
    }
}

pub fn photo(identity: &str, n: usize) -> String {
    format!("https://cdn.example.com/{identity}/{n}.jpg")
}

/// Input that makes a complete (swipeable) profile.
pub fn complete(identity: &str, name: &str) -> ProfileInput {
    ProfileInput {
        name: Some(name.to_string()),
        birthday: NaiveDate::from_ymd_opt(1995, 6, 1),
        gender: Some("female".to_string()),
        timezone: Some("Europe/Berlin".to_string()),
        photos: Some(vec![photo(identity, 0), photo(identity, 1)]),
        skills: Some(vec!["rust".to_string(), "go".to_string()]),
        ..Default::default()
    }
}

/// Save complete profiles for every identity, in order.
pub async fn seed(svc: &Service, ids: &[&str]) {
    for id in ids {
        let name = format!("{} Tester", id.split('@').next().unwrap_or(id));
        if let Err(e) = svc.save_profile(id, complete(id, &name)).await {
            panic!("seeding {id} failed: {e}");
        }
    }
}

pub fn ids(profiles: &[matching::contract::model::Profile]) -> Vec<&str> {
    profiles.iter().map(|p| p.identity.as_str()).collect()
}
