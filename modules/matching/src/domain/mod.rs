pub mod error;
pub mod ledger;
pub mod ports;
pub mod profile_store;
pub mod queue;
pub mod repo;
pub mod service;
pub mod session;
