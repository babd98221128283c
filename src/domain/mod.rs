//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod ledger;
pub mod password;
pub mod registry;

pub use entities::*;
pub use error::DomainError;
pub use password::next_password;
pub use registry::{NewService, Registry, ServiceDefaults};
