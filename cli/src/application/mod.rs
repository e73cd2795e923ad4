//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

pub use ports::{ConfigLoader, ConfigStore, InputSink, OutputSink, Prompt, RemoteService};
pub use services::operation::{
    OperationHandle, OperationRequest, Orchestrator, OrchestratorSettings,
};
