//! # Reaction Toggle
//!
//! Maintains at most one reaction per (account, response) pair and applies
//! toggle semantics on repeated votes. Evaluation and application run under
//! a per-pair lock, so two racing requests from the same account cannot
//! produce duplicate reactions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use domains::{Reaction, ReactionStore, Result};

use crate::locks::KeyedLocks;

/// What a vote did to the stored reaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VoteOutcome {
    Created(Reaction),
    Updated(Reaction),
    Deleted,
}

pub struct ReactionToggle {
    reactions: Arc<dyn ReactionStore>,
    pair_locks: KeyedLocks<(Uuid, Uuid)>,
}

impl ReactionToggle {
    pub fn new(reactions: Arc<dyn ReactionStore>) -> Self {
        Self {
            reactions,
            pair_locks: KeyedLocks::new(),
        }
    }

    /// First vote creates, the same polarity again deletes (un-voting), the
    /// opposite polarity flips the stored reaction in place.
    pub async fn vote(
        &self,
        account_id: Uuid,
        response_id: Uuid,
        like: bool,
        now: DateTime<Utc>,
    ) -> Result<VoteOutcome> {
        let _guard = self.pair_locks.acquire((account_id, response_id)).await;

        match self.reactions.get(account_id, response_id).await? {
            None => {
                let reaction = Reaction {
                    id: Uuid::now_v7(),
                    response_id,
                    account_id,
                    like,
                    created_at: now,
                };
                self.reactions.insert(reaction.clone()).await?;
                debug!(response = %response_id, like, "reaction created");
                Ok(VoteOutcome::Created(reaction))
            }
            Some(existing) if existing.like == like => {
                self.reactions.delete(account_id, response_id).await?;
                debug!(response = %response_id, "reaction removed");
                Ok(VoteOutcome::Deleted)
            }
            Some(mut existing) => {
                self.reactions.set_like(account_id, response_id, like).await?;
                existing.like = like;
                debug!(response = %response_id, like, "reaction flipped");
                Ok(VoteOutcome::Updated(existing))
            }
        }
    }
}
