//! Reaction toggle semantics and the per-pair uniqueness invariant.

mod common;

use chrono::Utc;
use domains::{ForumError, ReactionStore};
use services::VoteOutcome;
use tokio::task::JoinSet;
use uuid::Uuid;

use common::{harness, member, Harness};

async fn stored_like(h: &Harness, account: Uuid, response: Uuid) -> Option<bool> {
    ReactionStore::get(h.store.as_ref(), account, response)
        .await
        .unwrap()
        .map(|r| r.like)
}

#[tokio::test]
async fn vote_then_unvote_then_flip() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let (_, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    let outcome = h
        .service
        .vote(root.id, alice.id, true, Utc::now())
        .await
        .unwrap();
    assert!(matches!(outcome, VoteOutcome::Created(_)));
    assert_eq!(stored_like(&h, alice.id, root.id).await, Some(true));

    // Same polarity again un-votes.
    let outcome = h
        .service
        .vote(root.id, alice.id, true, Utc::now())
        .await
        .unwrap();
    assert_eq!(outcome, VoteOutcome::Deleted);
    assert_eq!(stored_like(&h, alice.id, root.id).await, None);

    let outcome = h
        .service
        .vote(root.id, alice.id, false, Utc::now())
        .await
        .unwrap();
    match outcome {
        VoteOutcome::Created(reaction) => assert!(!reaction.like),
        other => panic!("expected a fresh dislike, got {other:?}"),
    }
}

#[tokio::test]
async fn opposite_polarity_flips_in_place() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let (_, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    h.service
        .vote(root.id, alice.id, true, Utc::now())
        .await
        .unwrap();
    let outcome = h
        .service
        .vote(root.id, alice.id, false, Utc::now())
        .await
        .unwrap();
    match outcome {
        VoteOutcome::Updated(reaction) => assert!(!reaction.like),
        other => panic!("expected a flip, got {other:?}"),
    }
    assert_eq!(stored_like(&h, alice.id, root.id).await, Some(false));
}

#[tokio::test]
async fn any_vote_sequence_leaves_at_most_one_reaction() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let (_, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    for like in [true, true, false, false, true, false, false] {
        h.service
            .vote(root.id, alice.id, like, Utc::now())
            .await
            .unwrap();
        // The store is keyed by the pair, so presence is the whole check.
        let _ = stored_like(&h, alice.id, root.id).await;
    }
    // t,t -> gone; f -> dislike; f -> gone; t -> like; f -> flip; f -> gone.
    assert_eq!(stored_like(&h, alice.id, root.id).await, None);
}

#[tokio::test]
async fn racing_votes_from_one_account_never_duplicate() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let (_, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..10 {
        let service = h.service.clone();
        let (response_id, account_id) = (root.id, alice.id);
        tasks.spawn(async move {
            service
                .vote(response_id, account_id, true, Utc::now())
                .await
                .unwrap()
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap();
    }

    // Ten serialized same-polarity toggles land on "no reaction".
    assert_eq!(stored_like(&h, alice.id, root.id).await, None);
}

#[tokio::test]
async fn voting_on_a_missing_response_is_not_found() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let err = h
        .service
        .vote(Uuid::now_v7(), alice.id, true, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ForumError::NotFound("response", _)));
}

#[tokio::test]
async fn two_accounts_react_independently() {
    let h = harness().await;
    let alice = member(&h, "alice").await;
    let bob = member(&h, "bob").await;
    let (_, root) = h
        .service
        .create_thread(h.forum_id, alice.id, "t", "root", Utc::now())
        .await
        .unwrap();

    h.service
        .vote(root.id, alice.id, true, Utc::now())
        .await
        .unwrap();
    h.service
        .vote(root.id, bob.id, false, Utc::now())
        .await
        .unwrap();

    assert_eq!(stored_like(&h, alice.id, root.id).await, Some(true));
    assert_eq!(stored_like(&h, bob.id, root.id).await, Some(false));
}
