//! # Response Sequencer
//!
//! Keeps `order_in_thread` a dense 1..N sequence matching creation order and
//! protects each thread's root response from deletion. Appends and deletes
//! on the same thread are serialized through a per-thread lock, so ordinal
//! computation never races with a concurrent structural change.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use domains::{Account, Capability, ForumError, Response, ResponseStore, Result};

use crate::access;
use crate::locks::KeyedLocks;

pub struct ResponseSequencer {
    responses: Arc<dyn ResponseStore>,
    thread_locks: KeyedLocks<Uuid>,
}

impl ResponseSequencer {
    pub fn new(responses: Arc<dyn ResponseStore>) -> Self {
        Self {
            responses,
            thread_locks: KeyedLocks::new(),
        }
    }

    /// Appends a response at position N+1.
    ///
    /// `created_at` is nudged forward when the caller's clock has not moved
    /// past the thread's latest response, keeping creation times strictly
    /// monotonic within the thread.
    pub async fn append(
        &self,
        thread_id: Uuid,
        responder_id: Uuid,
        message: String,
        now: DateTime<Utc>,
    ) -> Result<Response> {
        let _guard = self.thread_locks.acquire(thread_id).await;

        let ordinal = self.responses.count_by_thread(thread_id).await? + 1;
        let mut created_at = now;
        if let Some(latest) = self.responses.last_activity(thread_id).await? {
            if created_at <= latest {
                created_at = latest + Duration::microseconds(1);
            }
        }

        let response = Response {
            id: Uuid::now_v7(),
            thread_id,
            responder_id,
            message,
            order_in_thread: ordinal,
            edited: false,
            created_at,
        };
        self.responses.insert(response.clone()).await?;
        debug!(thread = %thread_id, ordinal, "response appended");
        Ok(response)
    }

    /// Deletes a response and renumbers the survivors to 1..N.
    ///
    /// The thread's earliest response is its root post and is refused with
    /// `Conflict` regardless of the actor's capabilities. The delete and the
    /// full renumber pass run under the thread lock, so concurrent deletes
    /// cannot write conflicting ordinals.
    pub async fn delete(&self, actor: &Account, response: &Response) -> Result<()> {
        let _guard = self.thread_locks.acquire(response.thread_id).await;

        let all = self.responses.list_by_thread(response.thread_id).await?;
        let Some(position) = all.iter().position(|r| r.id == response.id) else {
            return Err(ForumError::NotFound("response", response.id.to_string()));
        };
        if position == 0 {
            return Err(ForumError::Conflict(
                "the root post cannot be deleted; delete the thread instead".to_string(),
            ));
        }
        if !access::can_mutate(actor, response.responder_id, Capability::CanRemoveAnyResponse) {
            return Err(ForumError::Forbidden(
                "only the responder or a moderator may remove a response".to_string(),
            ));
        }

        self.responses.delete(response.id).await?;

        // Full recompute: simple and correct under any deletion pattern.
        let assignments: Vec<(Uuid, u32)> = all
            .iter()
            .filter(|r| r.id != response.id)
            .enumerate()
            .map(|(index, r)| (r.id, index as u32 + 1))
            .collect();
        self.responses.set_ordinals(&assignments).await?;
        debug!(
            thread = %response.thread_id,
            remaining = assignments.len(),
            "thread renumbered"
        );
        Ok(())
    }
}
