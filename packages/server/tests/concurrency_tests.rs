//! Races the engine is built to survive: simultaneous ready flags,
//! simultaneous mutual likes, duplicate invites in flight.

mod common;

use common::TestHarness;
use test_context::test_context;

use server_core::common::EngineError;
use server_core::domains::matching::actions;
use server_core::domains::matching::models::MutualMatch;
use server_core::kernel::NullCatalog;

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_ready_activates_once(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let (a, b) = tokio::join!(
        actions::mark_ready(alice.id, session.id, &ctx.db_pool),
        actions::mark_ready(bob.id, session.id, &ctx.db_pool),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // Whichever write lands second sees both flags and flips the status;
    // the final state is active either way.
    assert!(a.status == "active" || b.status == "active");
    let status = actions::get_session_status(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(status.session.status, "active");
    assert!(status.user_ready);
    assert!(status.partner_ready);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_mutual_likes_seal_one_match(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["603".to_string()], &ctx.db_pool)
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        actions::decide(alice.id, session.id, "603", true, &ctx.db_pool, &NullCatalog),
        actions::decide(bob.id, session.id, "603", true, &ctx.db_pool, &NullCatalog),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // The decisions serialize on the session lock: the second one sees the
    // first like and seals the match. The first may or may not announce it
    // depending on ordering, but never both.
    assert!(
        !(a.is_match && b.is_match),
        "both swipes claimed to seal the match"
    );

    let matches = MutualMatch::list_for_session(session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_ref, "603");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_duplicate_invites(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    // Both players invite each other at once; the pending-pair index lets
    // exactly one through.
    let (a, b) = tokio::join!(
        actions::invite(alice.id, bob.id, &ctx.db_pool),
        actions::invite(bob.id, alice.id, &ctx.db_pool),
    );

    let outcomes = [a, b];
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(outcomes
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, EngineError::Conflict(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_concurrent_overlapping_contributions(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let batch_a = vec!["1".to_string(), "2".to_string(), "3".to_string()];
    let batch_b = vec!["2".to_string(), "3".to_string(), "4".to_string()];

    let (a, b) = tokio::join!(
        actions::contribute(alice.id, session.id, batch_a, &ctx.db_pool),
        actions::contribute(bob.id, session.id, batch_b, &ctx.db_pool),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // The union is four items no matter how the inserts interleave.
    assert_eq!(a.added + b.added, 4);

    let pool = actions::list_pool(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(pool.len(), 4);
}
