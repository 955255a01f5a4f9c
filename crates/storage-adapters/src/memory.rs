//! # In-memory store
//!
//! Every aggregate lives in a concurrent map. The service layer holds the
//! relevant aggregate lock across its read-then-write sequences, so the
//! per-call guarantees here are enough.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use domains::{
    Account, AccountStore, CatalogStore, Forum, ForumError, ModerationProfile, Reaction,
    ReactionStore, Response, ResponseStore, Result, Section, Thread, ThreadStore,
};

#[derive(Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    account_names: DashMap<String, Uuid>,
    profiles: DashMap<Uuid, ModerationProfile>,
    sections: DashMap<Uuid, Section>,
    forums: DashMap<Uuid, Forum>,
    threads: DashMap<Uuid, Thread>,
    responses: DashMap<Uuid, Response>,
    reactions: DashMap<(Uuid, Uuid), Reaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert(&self, account: Account, profile: ModerationProfile) -> Result<()> {
        // Reserving the name first makes the uniqueness check atomic.
        match self.account_names.entry(account.name.clone()) {
            Entry::Occupied(_) => {
                return Err(ForumError::Duplicate(format!(
                    "display name '{}' is already taken",
                    account.name
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(account.id);
            }
        }
        self.profiles.insert(profile.account_id, profile);
        self.accounts.insert(account.id, account);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn profile(&self, account_id: Uuid) -> Result<Option<ModerationProfile>> {
        Ok(self.profiles.get(&account_id).map(|r| r.value().clone()))
    }

    async fn set_banned_until(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<()> {
        if !self.accounts.contains_key(&account_id) {
            return Err(ForumError::NotFound("account", account_id.to_string()));
        }
        self.profiles
            .entry(account_id)
            .and_modify(|p| p.banned_until = Some(until))
            .or_insert(ModerationProfile {
                account_id,
                banned_until: Some(until),
            });
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_section(&self, section: Section) -> Result<()> {
        self.sections.insert(section.id, section);
        Ok(())
    }

    async fn insert_forum(&self, forum: Forum) -> Result<()> {
        self.forums.insert(forum.id, forum);
        Ok(())
    }

    async fn list_sections(&self) -> Result<Vec<Section>> {
        let mut sections: Vec<Section> =
            self.sections.iter().map(|r| r.value().clone()).collect();
        sections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sections)
    }

    async fn list_forums_by_section(&self, section_id: Uuid) -> Result<Vec<Forum>> {
        let mut forums: Vec<Forum> = self
            .forums
            .iter()
            .filter(|r| r.section_id == section_id)
            .map(|r| r.value().clone())
            .collect();
        forums.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(forums)
    }

    async fn get_forum(&self, id: Uuid) -> Result<Option<Forum>> {
        Ok(self.forums.get(&id).map(|r| r.value().clone()))
    }
}

#[async_trait]
impl ThreadStore for MemoryStore {
    async fn create_with_root(&self, thread: Thread, root: Response) -> Result<()> {
        // Root goes in first so no reader ever sees a thread without it.
        self.responses.insert(root.id, root);
        self.threads.insert(thread.id, thread);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|r| r.value().clone()))
    }

    async fn list_by_forum(&self, forum_id: Uuid) -> Result<Vec<Thread>> {
        let mut threads: Vec<Thread> = self
            .threads
            .iter()
            .filter(|r| r.forum_id == forum_id)
            .map(|r| r.value().clone())
            .collect();
        threads.sort_by_key(|t| t.id);
        Ok(threads)
    }

    async fn set_pinned(&self, id: Uuid, pinned: bool) -> Result<()> {
        match self.threads.get_mut(&id) {
            Some(mut thread) => {
                thread.pinned = pinned;
                Ok(())
            }
            None => Err(ForumError::NotFound("thread", id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if self.threads.remove(&id).is_none() {
            return Err(ForumError::NotFound("thread", id.to_string()));
        }
        let response_ids: Vec<Uuid> = self
            .responses
            .iter()
            .filter(|r| r.thread_id == id)
            .map(|r| r.id)
            .collect();
        for response_id in response_ids {
            self.responses.remove(&response_id);
            self.reactions
                .retain(|_, reaction| reaction.response_id != response_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn insert(&self, response: Response) -> Result<()> {
        self.responses.insert(response.id, response);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Response>> {
        Ok(self.responses.get(&id).map(|r| r.value().clone()))
    }

    async fn list_by_thread(&self, thread_id: Uuid) -> Result<Vec<Response>> {
        let mut responses: Vec<Response> = self
            .responses
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .map(|r| r.value().clone())
            .collect();
        responses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(responses)
    }

    async fn count_by_thread(&self, thread_id: Uuid) -> Result<u32> {
        Ok(self
            .responses
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .count() as u32)
    }

    async fn last_activity(&self, thread_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .responses
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .map(|r| r.created_at)
            .max())
    }

    async fn update_message(&self, id: Uuid, message: &str) -> Result<()> {
        match self.responses.get_mut(&id) {
            Some(mut response) => {
                response.message = message.to_string();
                response.edited = true;
                Ok(())
            }
            None => Err(ForumError::NotFound("response", id.to_string())),
        }
    }

    async fn set_ordinals(&self, assignments: &[(Uuid, u32)]) -> Result<()> {
        for (id, ordinal) in assignments {
            match self.responses.get_mut(id) {
                Some(mut response) => response.order_in_thread = *ordinal,
                None => return Err(ForumError::NotFound("response", id.to_string())),
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        if self.responses.remove(&id).is_none() {
            return Err(ForumError::NotFound("response", id.to_string()));
        }
        self.reactions
            .retain(|_, reaction| reaction.response_id != id);
        Ok(())
    }
}

#[async_trait]
impl ReactionStore for MemoryStore {
    async fn get(&self, account_id: Uuid, response_id: Uuid) -> Result<Option<Reaction>> {
        Ok(self
            .reactions
            .get(&(account_id, response_id))
            .map(|r| r.value().clone()))
    }

    async fn insert(&self, reaction: Reaction) -> Result<()> {
        match self.reactions.entry((reaction.account_id, reaction.response_id)) {
            Entry::Occupied(_) => Err(ForumError::Duplicate(
                "a reaction already exists for this account and response".to_string(),
            )),
            Entry::Vacant(slot) => {
                slot.insert(reaction);
                Ok(())
            }
        }
    }

    async fn set_like(&self, account_id: Uuid, response_id: Uuid, like: bool) -> Result<()> {
        match self.reactions.get_mut(&(account_id, response_id)) {
            Some(mut reaction) => {
                reaction.like = like;
                Ok(())
            }
            None => Err(ForumError::NotFound(
                "reaction",
                format!("{account_id}/{response_id}"),
            )),
        }
    }

    async fn delete(&self, account_id: Uuid, response_id: Uuid) -> Result<()> {
        if self.reactions.remove(&(account_id, response_id)).is_none() {
            return Err(ForumError::NotFound(
                "reaction",
                format!("{account_id}/{response_id}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(name: &str) -> Account {
        Account {
            id: Uuid::now_v7(),
            name: name.to_string(),
            capabilities: vec![],
            created_at: Utc::now(),
        }
    }

    fn profile_for(account: &Account) -> ModerationProfile {
        ModerationProfile {
            account_id: account.id,
            banned_until: None,
        }
    }

    fn response_in(thread_id: Uuid, ordinal: u32) -> Response {
        Response {
            id: Uuid::now_v7(),
            thread_id,
            responder_id: Uuid::now_v7(),
            message: "hello".to_string(),
            order_in_thread: ordinal,
            edited: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_display_name_is_rejected() {
        let store = MemoryStore::new();
        let first = account("taken");
        let second = account("taken");
        let p1 = profile_for(&first);
        let p2 = profile_for(&second);
        AccountStore::insert(&store, first, p1).await.unwrap();
        let err = AccountStore::insert(&store, second, p2).await.unwrap_err();
        assert!(matches!(err, ForumError::Duplicate(_)));
    }

    #[tokio::test]
    async fn deleting_a_thread_cascades_to_responses_and_reactions() {
        let store = MemoryStore::new();
        let thread = Thread {
            id: Uuid::now_v7(),
            forum_id: Uuid::now_v7(),
            title: "t".to_string(),
            pinned: false,
            created_at: Utc::now(),
        };
        let root = response_in(thread.id, 1);
        let root_id = root.id;
        let voter = Uuid::now_v7();
        ThreadStore::create_with_root(&store, thread.clone(), root)
            .await
            .unwrap();
        ReactionStore::insert(
            &store,
            Reaction {
                id: Uuid::now_v7(),
                response_id: root_id,
                account_id: voter,
                like: true,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        ThreadStore::delete(&store, thread.id).await.unwrap();
        assert!(ResponseStore::get(&store, root_id).await.unwrap().is_none());
        assert!(ReactionStore::get(&store, voter, root_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn second_reaction_for_the_same_pair_is_a_duplicate() {
        let store = MemoryStore::new();
        let (voter, response_id) = (Uuid::now_v7(), Uuid::now_v7());
        let reaction = Reaction {
            id: Uuid::now_v7(),
            response_id,
            account_id: voter,
            like: true,
            created_at: Utc::now(),
        };
        ReactionStore::insert(&store, reaction.clone()).await.unwrap();
        let err = ReactionStore::insert(&store, reaction).await.unwrap_err();
        assert!(matches!(err, ForumError::Duplicate(_)));
    }

    #[tokio::test]
    async fn responses_list_in_creation_order() {
        let store = MemoryStore::new();
        let thread_id = Uuid::now_v7();
        for ordinal in 1..=3 {
            ResponseStore::insert(&store, response_in(thread_id, ordinal))
                .await
                .unwrap();
        }
        let listed = ResponseStore::list_by_thread(&store, thread_id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }
}
