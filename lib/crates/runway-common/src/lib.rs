//! Wire types shared between the runway client and the remote run service.

pub mod types;

pub use types::*;
