//! # Domain Models
//!
//! These structs represent the core entities of Agora.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated account. Identity is established by the upstream auth
/// layer; this crate only cares about who owns what and who may moderate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Elevated rights held by this account.
    pub capabilities: Vec<Capability>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Named rights an account can hold beyond plain ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Granted to every account at registration; revocable.
    CanCreateThreads,
    CanPinThreads,
    CanDeleteAnyThread,
    CanRemoveAnyResponse,
    CanBanUsers,
}

/// Moderation state attached to an account, created at registration.
///
/// An absent profile or a past `banned_until` means the account is
/// unrestricted; only a strictly future `banned_until` restricts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationProfile {
    pub account_id: Uuid,
    pub banned_until: Option<DateTime<Utc>>,
}

/// Named grouping of forums. No behavior beyond grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
}

/// A forum belongs to exactly one section and owns a set of threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forum {
    pub id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// A thread of discussion inside a forum.
///
/// Created together with its root response as a single logical operation;
/// a thread without responses is never a valid persisted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Uuid,
    pub forum_id: Uuid,
    pub title: String,
    /// Pinned threads sort ahead of everything else in the forum listing.
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// A single post inside a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub responder_id: Uuid,
    pub message: String,
    /// Dense 1-based position within the thread, matching creation order.
    pub order_in_thread: u32,
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

/// A like/dislike signal. At most one per (account, response) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: Uuid,
    pub response_id: Uuid,
    pub account_id: Uuid,
    pub like: bool,
    pub created_at: DateTime<Utc>,
}
