//! Deterministic, pure logic shared by the session tracker.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod conditions;
pub mod history;
pub mod hydration;
pub mod records;
pub mod timer;
pub mod window;
