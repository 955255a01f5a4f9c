//! Thread and response lifecycle: validation, editing, cascades,
//! registration uniqueness.

mod common;

use chrono::{Duration, Utc};
use domains::{Capability, ForumError, ReactionStore, ResponseStore, ThreadStore};
use services::MAX_MESSAGE_CHARS;

use common::{harness, member, privileged};

#[tokio::test]
async fn invalid_root_message_leaves_no_orphan_thread() {
    let h = harness().await;
    let alice = member(&h, "alice").await;

    let err = h
        .service
        .create_thread(h.forum_id, alice.id, "title", "   ", Utc::now())
        .await
        .unwrap_err();
    let ForumError::ValidationFailed(fields) = err else {
        panic!("expected a validation failure");
    };
    assert_eq!(fields[0].field, "message");

    let threads = ThreadStore::list_by_forum(h.store.as_ref(), h.forum_id)
        .await
        .unwrap();
    assert!(threads.is_empty());
}

#[tokio::test]
async fn message_bound_is_exactly_one_thousand_characters() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let (thread, _) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    let at_limit = "x".repeat(MAX_MESSAGE_CHARS);
    assert!(h
        .service
        .create_response(thread.id, alice.id, &at_limit, Utc::now())
        .await
        .is_ok());

    let over = "x".repeat(MAX_MESSAGE_CHARS + 1);
    let err = h
        .service
        .create_response(thread.id, alice.id, &over, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::ValidationFailed(_)));
}

#[tokio::test]
async fn editing_replaces_the_message_and_marks_it() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let bob = member(&h, "bob").await;
    let (thread, _) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();
    let reply = h
        .service
        .create_response(thread.id, alice.id, "draft", Utc::now())
        .await
        .unwrap();

    let err = h
        .service
        .edit_response(reply.id, bob.id, "hijacked")
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::Forbidden(_)));

    h.service
        .edit_response(reply.id, alice.id, "final")
        .await
        .unwrap();
    let stored = ResponseStore::get(h.store.as_ref(), reply.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.edited);
    assert_eq!(stored.message, "final");
}

#[tokio::test]
async fn deleting_a_thread_takes_responses_and_reactions_with_it() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let bob = member(&h, "bob").await;
    let (thread, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();
    let reply = h
        .service
        .create_response(thread.id, bob.id, "reply", Utc::now())
        .await
        .unwrap();
    h.service
        .vote(reply.id, bob.id, true, Utc::now())
        .await
        .unwrap();

    h.service.delete_thread(thread.id, alice.id).await.unwrap();

    assert!(h.service.get_thread(thread.id).await.is_err());
    for id in [root.id, reply.id] {
        assert!(ResponseStore::get(h.store.as_ref(), id)
            .await
            .unwrap()
            .is_none());
    }
    assert!(ReactionStore::get(h.store.as_ref(), bob.id, reply.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn thread_deletion_needs_ownership_or_the_capability() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let bob = member(&h, "bob").await;
    let warden = privileged(&h, "warden", vec![Capability::CanDeleteAnyThread]).await;

    let (thread, _) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    let err = h
        .service
        .delete_thread(thread.id, bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::Forbidden(_)));

    h.service.delete_thread(thread.id, warden.id).await.unwrap();
}

#[tokio::test]
async fn taken_display_name_is_a_duplicate() {
    let h = harness().await;
    member(&h, "alice").await;
    let err = h
        .service
        .register_account("alice", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::Duplicate(_)));
}

#[tokio::test]
async fn account_view_exposes_the_ban_deadline() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let sheriff = privileged(&h, "sheriff", vec![Capability::CanBanUsers]).await;
    let until = Utc::now() + Duration::days(2);
    h.service.set_ban(alice.id, sheriff.id, until).await.unwrap();

    let (_, profile) = h.service.get_account(alice.id).await.unwrap();
    assert_eq!(profile.unwrap().banned_until, Some(until));
}

#[tokio::test]
async fn sections_list_their_forums() {
    let h = harness().await;
    let listing = h.service.list_sections().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].forums.len(), 1);
    assert_eq!(listing[0].forums[0].id, h.forum_id);
}
