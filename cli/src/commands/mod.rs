//! Command implementations

pub mod apply;
pub mod config;
pub mod operation;
pub mod plan;
pub mod version;
