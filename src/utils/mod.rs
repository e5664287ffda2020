//! Shared helpers for validating input and formatting output.

pub mod format;
pub mod validation;

/// Current time as unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
