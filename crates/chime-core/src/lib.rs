//! chime-core — shared types and collaborator interfaces for the Chime
//! job scheduler.
//!
//! Holds the [`Job`] data model, the recurrence [`Rule`] variants, the
//! [`JobStore`] / [`Notifier`] / [`WorkHandler`] collaborator traits the
//! scheduling engine is wired against, and the workspace-wide config and
//! error types.

pub mod config;
pub mod error;
pub mod notify;
pub mod rule;
pub mod store;
pub mod types;
pub mod work;

pub use config::ChimeConfig;
pub use error::{ChimeError, Result};
pub use notify::Notifier;
pub use rule::{parse_time, Frequency, RuleSpec};
pub use store::{JobStore, StoreError};
pub use types::{Job, Rule};
pub use work::WorkHandler;
