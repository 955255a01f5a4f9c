//! Shared fixtures for the scenario suites.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{Account, AccountStore, Capability, CatalogStore, Forum, ModerationProfile, Section};
use services::ForumService;
use storage_adapters::MemoryStore;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub service: Arc<ForumService>,
    pub forum_id: Uuid,
}

pub async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let section = Section {
        id: Uuid::now_v7(),
        name: "General".to_string(),
    };
    let forum = Forum {
        id: Uuid::now_v7(),
        section_id: section.id,
        name: "Chatter".to_string(),
        description: None,
    };
    let forum_id = forum.id;
    store.insert_section(section).await.unwrap();
    store.insert_forum(forum).await.unwrap();
    let service = Arc::new(ForumService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    Harness {
        store,
        service,
        forum_id,
    }
}

/// Registers an ordinary member through the service.
pub async fn member(h: &Harness, name: &str) -> Account {
    h.service.register_account(name, Utc::now()).await.unwrap()
}

/// Inserts an account holding the given capabilities directly.
pub async fn privileged(h: &Harness, name: &str, capabilities: Vec<Capability>) -> Account {
    let account = Account {
        id: Uuid::now_v7(),
        name: name.to_string(),
        capabilities,
        created_at: Utc::now(),
    };
    let profile = ModerationProfile {
        account_id: account.id,
        banned_until: None,
    };
    AccountStore::insert(h.store.as_ref(), account.clone(), profile)
        .await
        .unwrap();
    account
}
