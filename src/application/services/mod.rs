//! Application services
//!
//! Concrete services that hold state and write it through to a
//! [`StateStore`](crate::infrastructure::traits::StateStore) after every
//! applied transition. Services depend on I/O boundary traits but are
//! themselves concrete structs, not traits.

mod integration;
mod password;

pub use integration::IntegrationService;
pub use password::PasswordService;
