//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod outcome;
pub mod policy;
pub mod request;
pub mod run;
pub mod snapshot;
pub mod summary;

pub use config::{RunwayConfig, validate_config_key, validate_config_value};
pub use error::{ConfigError, OperationError, RemoteError, ValidationError};
pub use outcome::{OperationOutcome, OperationResult};
pub use policy::PolicyOutcome;
pub use request::{OperationKind, OperationSpec, Variable, validate};
pub use run::{RunEnd, Step, transition};
pub use snapshot::ConfigSnapshot;
