//! # Ban Gate
//!
//! Decides whether a content-mutating action is permitted for an account at
//! a given instant. Read-only actions never consult this gate.

use chrono::{DateTime, Utc};
use domains::ModerationProfile;

/// Returns the active restriction, if any.
///
/// Absence of a profile means "never banned". Both sides of the comparison
/// are `DateTime<Utc>`, so naive/aware timestamps cannot be mixed. A
/// `banned_until` equal to `now` is already expired; only a strictly future
/// value restricts.
pub fn restriction(
    profile: Option<&ModerationProfile>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match profile.and_then(|p| p.banned_until) {
        Some(until) if until > now => Some(until),
        _ => None,
    }
}
