//! # ModKit - module contracts for HackMatch
//!
//! Modules implement [`Module`] (wiring) and optionally [`RestfulModule`],
//! [`RestHostModule`] or [`StatefulModule`]. The binary collects them into a
//! [`ModuleRegistry`] and hands it to [`runtime::run`], which drives the
//! phases: init → REST → start → wait → stop.

pub use anyhow::Result;
pub use async_trait::async_trait;

pub mod api;
pub mod client_hub;
pub mod context;
pub mod contracts;
pub mod registry;
pub mod runtime;

pub use api::problem::{unauthorized, Problem, ProblemResponse};
pub use api::{OpenApiDocRegistry, OpenApiRegistry, OperationBuilder};
pub use client_hub::ClientHub;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};
pub use contracts::*;
pub use registry::{ModuleRegistry, RegistryError};
