//! veil-core - Core library for Veil
//!
//! This crate holds the state-synchronization layer behind a privacy &
//! security settings screen: cached server state with single-flight reloads,
//! derived view values, lifecycle-driven refetching, and the gated cloud
//! password mutation flows.

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod lifecycle;
pub mod memory;
pub mod models;
pub mod mutation;
pub mod passcode;
pub mod screen;
pub mod service;
pub mod signal;
pub mod store;
pub mod util;
pub mod views;

pub use context::AccountContext;
pub use error::{Error, Result};
pub use models::{LocalPasscodeState, PasswordState, PrivacyKey, PrivacyOption, PrivacyRule};
pub use store::StateStore;
