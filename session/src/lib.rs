//! State tracking for behavioral experiment sessions.
//!
//! The host experiment loop drives a [`tracker::SessionTracker`] between
//! trials: it checks gating (time window, hydration), registers task
//! conditions and records each trial's choice and reward. The crate keeps a
//! strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (history statistics, window and
//!   hydration gating, condition enrichment). No I/O.
//! - **[`io`]**: Side-effecting collaborators (config, trial log, condition
//!   store). Isolated so hosts can swap in their own persistence.
//!
//! Task-specific hooks live behind the [`behavior::Behavior`] trait and the
//! logging collaborator behind [`logger::SessionLogger`].

pub mod behavior;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logger;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tracker;
