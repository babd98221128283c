//! hirepass: rolling hire passwords
//!
//! Each service advances a numeric code with a linear recurrence
//! `next = (current * multiplier + addend) mod modulus` and keeps a bounded,
//! rewindable history.
//!
//! # Architecture
//!
//! - [`domain`]: entities, password state machine, service registry (no I/O)
//! - [`application`]: services holding state, written through to a store
//! - [`infrastructure`]: I/O traits, JSON store, form submitter, DI container
//! - [`cli`]: argument parsing and command dispatch
//! - [`config`]: layered settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
