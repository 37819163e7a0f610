#![forbid(unsafe_code)]

//! Core domain model and scheduling logic for the Mnemo spaced-repetition system.
//!
//! This crate provides:
//! - Domain types (cards, ratings, review events)
//! - SM-2 review scheduling
//! - Due-queue selection and prioritization
//! - Session state machine for same-session re-reviews
//! - Persistence (card store, review journal, CSV rollup)
//! - Statistics aggregation

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod scheduler;
pub mod selection;
pub mod session;
pub mod stats;
pub mod store;
pub mod journal;
pub mod csv_rollup;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use scheduler::{apply_review, ReviewOutcome, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};
pub use selection::{is_due, select_by_tags, select_due, select_due_tagged};
pub use session::{ReviewSession, SessionState, SessionStep};
pub use stats::{compute_stats, Stats};
pub use store::{find_by_id, find_by_id_mut, CardStore};
pub use journal::{JsonlSink, ReviewSink};
