//! # ForumService
//!
//! Orchestrates every inbound action: ban gate and capability checks first,
//! then the mutation, then whatever derived-ordering repair the change
//! needs. Methods take the clock explicitly, so tests can pin "now".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use domains::{
    Account, AccountStore, Capability, CatalogStore, FieldError, Forum, ForumError,
    ModerationProfile, ReactionStore, Response, ResponseStore, Result, Section, Thread,
    ThreadStore,
};

use crate::access;
use crate::ban;
use crate::ranking::{self, RankedThread, ThreadPage};
use crate::reactions::{ReactionToggle, VoteOutcome};
use crate::sequencer::ResponseSequencer;

/// Message length cap, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;
/// Thread title length cap.
pub const MAX_TITLE_CHARS: usize = 120;
/// Display name length cap.
pub const MAX_NAME_CHARS: usize = 60;

/// A section with the forums it groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionListing {
    pub section: Section,
    pub forums: Vec<Forum>,
}

pub struct ForumService {
    accounts: Arc<dyn AccountStore>,
    catalog: Arc<dyn CatalogStore>,
    threads: Arc<dyn ThreadStore>,
    responses: Arc<dyn ResponseStore>,
    sequencer: ResponseSequencer,
    toggle: ReactionToggle,
}

impl ForumService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        catalog: Arc<dyn CatalogStore>,
        threads: Arc<dyn ThreadStore>,
        responses: Arc<dyn ResponseStore>,
        reactions: Arc<dyn ReactionStore>,
    ) -> Self {
        Self {
            accounts,
            catalog,
            threads,
            sequencer: ResponseSequencer::new(responses.clone()),
            responses,
            toggle: ReactionToggle::new(reactions),
        }
    }

    // ── Accounts ────────────────────────────────────────────────────────

    /// Registers an account and its moderation profile in one step.
    ///
    /// Every account starts with `can-create-threads`. A taken display name
    /// surfaces as `Duplicate` from the store.
    pub async fn register_account(&self, name: &str, now: DateTime<Utc>) -> Result<Account> {
        let name = name.trim();
        let mut fields = Vec::new();
        if name.is_empty() {
            fields.push(FieldError::new("name", "must not be empty"));
        } else if name.chars().count() > MAX_NAME_CHARS {
            fields.push(FieldError::new(
                "name",
                format!("longer than {MAX_NAME_CHARS} characters"),
            ));
        }
        if !fields.is_empty() {
            return Err(ForumError::ValidationFailed(fields));
        }

        let account = Account {
            id: Uuid::now_v7(),
            name: name.to_string(),
            capabilities: vec![Capability::CanCreateThreads],
            created_at: now,
        };
        let profile = ModerationProfile {
            account_id: account.id,
            banned_until: None,
        };
        self.accounts.insert(account.clone(), profile).await?;
        info!(account = %account.id, "account registered");
        Ok(account)
    }

    pub async fn get_account(&self, id: Uuid) -> Result<(Account, Option<ModerationProfile>)> {
        let account = self.require_account(id).await?;
        let profile = self.accounts.profile(id).await?;
        Ok((account, profile))
    }

    /// Overwrites `banned_until` unconditionally; a past date lifts a ban
    /// early. Requires `can-ban-users`.
    pub async fn set_ban(
        &self,
        account_id: Uuid,
        actor_id: Uuid,
        until: DateTime<Utc>,
    ) -> Result<()> {
        let actor = self.require_account(actor_id).await?;
        if !actor.has_capability(Capability::CanBanUsers) {
            return Err(ForumError::Forbidden(
                "banning requires the can-ban-users capability".to_string(),
            ));
        }
        self.require_account(account_id).await?;
        self.accounts.set_banned_until(account_id, until).await?;
        info!(account = %account_id, %until, actor = %actor_id, "ban updated");
        Ok(())
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    pub async fn list_sections(&self) -> Result<Vec<SectionListing>> {
        let sections = self.catalog.list_sections().await?;
        let mut listing = Vec::with_capacity(sections.len());
        for section in sections {
            let forums = self.catalog.list_forums_by_section(section.id).await?;
            listing.push(SectionListing { section, forums });
        }
        Ok(listing)
    }

    // ── Threads ─────────────────────────────────────────────────────────

    /// Creates a thread together with its root response. If the root fails
    /// validation nothing persists; the store write itself is atomic.
    pub async fn create_thread(
        &self,
        forum_id: Uuid,
        creator_id: Uuid,
        title: &str,
        root_message: &str,
        now: DateTime<Utc>,
    ) -> Result<(Thread, Response)> {
        let creator = self.require_account(creator_id).await?;
        self.ensure_not_banned(&creator, now).await?;
        if !creator.has_capability(Capability::CanCreateThreads) {
            return Err(ForumError::Forbidden(
                "thread creation requires the can-create-threads capability".to_string(),
            ));
        }

        let mut fields = Vec::new();
        validate_title(title, &mut fields);
        validate_message(root_message, &mut fields);
        if !fields.is_empty() {
            return Err(ForumError::ValidationFailed(fields));
        }

        if self.catalog.get_forum(forum_id).await?.is_none() {
            return Err(ForumError::NotFound("forum", forum_id.to_string()));
        }

        let thread = Thread {
            id: Uuid::now_v7(),
            forum_id,
            title: title.trim().to_string(),
            pinned: false,
            created_at: now,
        };
        let root = Response {
            id: Uuid::now_v7(),
            thread_id: thread.id,
            responder_id: creator.id,
            message: root_message.trim().to_string(),
            order_in_thread: 1,
            edited: false,
            created_at: now,
        };
        self.threads
            .create_with_root(thread.clone(), root.clone())
            .await?;
        info!(thread = %thread.id, forum = %forum_id, "thread created");
        Ok((thread, root))
    }

    /// The thread and its responses, ordered root-first.
    pub async fn get_thread(&self, thread_id: Uuid) -> Result<(Thread, Vec<Response>)> {
        let thread = self.require_thread(thread_id).await?;
        let responses = self.responses.list_by_thread(thread_id).await?;
        Ok((thread, responses))
    }

    /// Ranked, paginated listing of a forum's threads.
    pub async fn list_threads(&self, forum_id: Uuid, page: u32) -> Result<ThreadPage> {
        if self.catalog.get_forum(forum_id).await?.is_none() {
            return Err(ForumError::NotFound("forum", forum_id.to_string()));
        }
        let threads = self.threads.list_by_forum(forum_id).await?;
        let mut entries = Vec::with_capacity(threads.len());
        for thread in threads {
            let last_activity = self
                .responses
                .last_activity(thread.id)
                .await?
                .unwrap_or(thread.created_at);
            let response_count = self.responses.count_by_thread(thread.id).await?;
            entries.push(RankedThread {
                thread,
                last_activity,
                response_count,
            });
        }
        Ok(ranking::paginate(ranking::rank(entries), page))
    }

    /// Ownership never grants pin rights; only the capability does.
    pub async fn set_pin(&self, thread_id: Uuid, actor_id: Uuid, pinned: bool) -> Result<Thread> {
        let actor = self.require_account(actor_id).await?;
        if !actor.has_capability(Capability::CanPinThreads) {
            return Err(ForumError::Forbidden(
                "pinning requires the can-pin-threads capability".to_string(),
            ));
        }
        let mut thread = self.require_thread(thread_id).await?;
        self.threads.set_pinned(thread_id, pinned).await?;
        thread.pinned = pinned;
        info!(thread = %thread_id, pinned, "thread pin updated");
        Ok(thread)
    }

    /// Deleting a thread is how a root post goes away; cascades to all
    /// responses and their reactions.
    pub async fn delete_thread(&self, thread_id: Uuid, actor_id: Uuid) -> Result<()> {
        let actor = self.require_account(actor_id).await?;
        self.require_thread(thread_id).await?;
        let responses = self.responses.list_by_thread(thread_id).await?;
        // The root responder owns the thread.
        let allowed = match responses.first() {
            Some(root) => access::can_mutate(&actor, root.responder_id, Capability::CanDeleteAnyThread),
            None => actor.has_capability(Capability::CanDeleteAnyThread),
        };
        if !allowed {
            return Err(ForumError::Forbidden(
                "only the thread creator or a moderator may delete a thread".to_string(),
            ));
        }
        self.threads.delete(thread_id).await?;
        info!(thread = %thread_id, actor = %actor_id, "thread deleted");
        Ok(())
    }

    // ── Responses ───────────────────────────────────────────────────────

    pub async fn create_response(
        &self,
        thread_id: Uuid,
        responder_id: Uuid,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Response> {
        let responder = self.require_account(responder_id).await?;
        self.ensure_not_banned(&responder, now).await?;

        let mut fields = Vec::new();
        validate_message(message, &mut fields);
        if !fields.is_empty() {
            return Err(ForumError::ValidationFailed(fields));
        }

        self.require_thread(thread_id).await?;
        self.sequencer
            .append(thread_id, responder.id, message.trim().to_string(), now)
            .await
    }

    /// Replaces the message and marks the response edited. Ordering is
    /// untouched.
    pub async fn edit_response(
        &self,
        response_id: Uuid,
        actor_id: Uuid,
        new_message: &str,
    ) -> Result<Response> {
        let actor = self.require_account(actor_id).await?;
        let mut response = self.require_response(response_id).await?;
        if !access::can_mutate(&actor, response.responder_id, Capability::CanRemoveAnyResponse) {
            return Err(ForumError::Forbidden(
                "only the responder or a moderator may edit a response".to_string(),
            ));
        }

        let mut fields = Vec::new();
        validate_message(new_message, &mut fields);
        if !fields.is_empty() {
            return Err(ForumError::ValidationFailed(fields));
        }

        let trimmed = new_message.trim();
        self.responses.update_message(response_id, trimmed).await?;
        response.message = trimmed.to_string();
        response.edited = true;
        Ok(response)
    }

    pub async fn delete_response(&self, response_id: Uuid, actor_id: Uuid) -> Result<()> {
        let actor = self.require_account(actor_id).await?;
        let response = self.require_response(response_id).await?;
        self.sequencer.delete(&actor, &response).await?;
        info!(response = %response_id, actor = %actor_id, "response deleted");
        Ok(())
    }

    // ── Reactions ───────────────────────────────────────────────────────

    pub async fn vote(
        &self,
        response_id: Uuid,
        account_id: Uuid,
        like: bool,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome> {
        let account = self.require_account(account_id).await?;
        self.require_response(response_id).await?;
        self.toggle.vote(account.id, response_id, like, now).await
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    async fn require_account(&self, id: Uuid) -> Result<Account> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(|| ForumError::NotFound("account", id.to_string()))
    }

    async fn require_thread(&self, id: Uuid) -> Result<Thread> {
        self.threads
            .get(id)
            .await?
            .ok_or_else(|| ForumError::NotFound("thread", id.to_string()))
    }

    async fn require_response(&self, id: Uuid) -> Result<Response> {
        self.responses
            .get(id)
            .await?
            .ok_or_else(|| ForumError::NotFound("response", id.to_string()))
    }

    async fn ensure_not_banned(&self, account: &Account, now: DateTime<Utc>) -> Result<()> {
        let profile = self.accounts.profile(account.id).await?;
        if let Some(until) = ban::restriction(profile.as_ref(), now) {
            return Err(ForumError::Banned(until));
        }
        Ok(())
    }
}

fn validate_title(raw: &str, fields: &mut Vec<FieldError>) {
    let title = raw.trim();
    if title.is_empty() {
        fields.push(FieldError::new("title", "must not be empty"));
    } else if title.chars().count() > MAX_TITLE_CHARS {
        fields.push(FieldError::new(
            "title",
            format!("longer than {MAX_TITLE_CHARS} characters"),
        ));
    }
}

fn validate_message(raw: &str, fields: &mut Vec<FieldError>) {
    let message = raw.trim();
    if message.is_empty() {
        fields.push(FieldError::new("message", "must not be empty"));
    } else if message.chars().count() > MAX_MESSAGE_CHARS {
        fields.push(FieldError::new(
            "message",
            format!("longer than {MAX_MESSAGE_CHARS} characters"),
        ));
    }
}
