//! # Store Ports
//!
//! Persistence contracts the service layer is written against. Adapters in
//! `storage-adapters` implement these; anything needing stronger isolation
//! than a single call documents it on the method.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Account, Forum, ModerationProfile, Reaction, Response, Section, Thread};

/// Accounts and their moderation profiles.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persists an account together with its moderation profile.
    /// Atomic: a half-registered account is never observable.
    /// Returns `Duplicate` when the display name is already taken.
    async fn insert(&self, account: Account, profile: ModerationProfile) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Account>>;

    async fn profile(&self, account_id: Uuid) -> Result<Option<ModerationProfile>>;

    /// Overwrites `banned_until` unconditionally.
    /// Returns `NotFound` when the account does not exist.
    async fn set_banned_until(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<()>;
}

/// Sections and forums. Pure grouping records, written once at seed time.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_section(&self, section: Section) -> Result<()>;

    async fn insert_forum(&self, forum: Forum) -> Result<()>;

    async fn list_sections(&self) -> Result<Vec<Section>>;

    async fn list_forums_by_section(&self, section_id: Uuid) -> Result<Vec<Forum>>;

    async fn get_forum(&self, id: Uuid) -> Result<Option<Forum>>;
}

/// Threads of a forum.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Persists a thread together with its root response.
    /// Atomic: if the root cannot be written, the thread must not persist.
    async fn create_with_root(&self, thread: Thread, root: Response) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Thread>>;

    async fn list_by_forum(&self, forum_id: Uuid) -> Result<Vec<Thread>>;

    /// Returns `NotFound` when the thread does not exist.
    async fn set_pinned(&self, id: Uuid, pinned: bool) -> Result<()>;

    /// Deletes the thread, cascading to its responses and their reactions.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Responses within threads.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ResponseStore: Send + Sync {
    async fn insert(&self, response: Response) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Response>>;

    /// All responses of a thread, ordered by `created_at` ascending.
    async fn list_by_thread(&self, thread_id: Uuid) -> Result<Vec<Response>>;

    async fn count_by_thread(&self, thread_id: Uuid) -> Result<u32>;

    /// `max(created_at)` over the thread's responses.
    async fn last_activity(&self, thread_id: Uuid) -> Result<Option<DateTime<Utc>>>;

    /// Replaces the message and sets the `edited` flag.
    async fn update_message(&self, id: Uuid, message: &str) -> Result<()>;

    /// Rewrites `order_in_thread` for the given responses.
    async fn set_ordinals(&self, assignments: &[(Uuid, u32)]) -> Result<()>;

    /// Deletes the response, cascading to its reactions.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Reactions, keyed by the (account, response) pair.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ReactionStore: Send + Sync {
    async fn get(&self, account_id: Uuid, response_id: Uuid) -> Result<Option<Reaction>>;

    /// Returns `Duplicate` when a reaction for the pair already exists.
    async fn insert(&self, reaction: Reaction) -> Result<()>;

    async fn set_like(&self, account_id: Uuid, response_id: Uuid, like: bool) -> Result<()>;

    async fn delete(&self, account_id: Uuid, response_id: Uuid) -> Result<()>;
}
