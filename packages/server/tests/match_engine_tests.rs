//! Integration tests for the match engine: invitations, session lifecycle,
//! pool contributions, swipes, and mutual-match sealing.

mod common;

use common::TestHarness;
use test_context::test_context;

use server_core::common::EngineError;
use server_core::domains::matching::actions;
use server_core::kernel::NullCatalog;

// =============================================================================
// Invitations
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_invite_requires_friendship(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;

    let err = actions::invite(alice.id, bob.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_invite_self_rejected(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;

    let err = actions::invite(alice.id, alice.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_duplicate_invite_conflicts_in_both_directions(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();

    let err = actions::invite(alice.id, bob.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // The reverse direction is the same pair.
    let err = actions::invite(bob.id, alice.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_reinvite_after_rejection(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    let invitation = actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();
    let (rejected, session) = actions::respond(bob.id, invitation.id, false, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(rejected.status, "rejected");
    assert!(session.is_none());

    // A rejected invitation no longer blocks the pair.
    actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_only_receiver_can_respond(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    let invitation = actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();

    let err = actions::respond(alice.id, invitation.id, true, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_cancel_invitation(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    let invitation = actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();

    // Only the sender can cancel.
    let err = actions::cancel_invitation(bob.id, invitation.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let cancelled = actions::cancel_invitation(alice.id, invitation.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    // Responding to a cancelled invitation is a lifecycle error.
    let err = actions::respond(bob.id, invitation.id, true, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_accept_creates_lobby_session(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    let invitation = actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();
    let (accepted, session) = actions::respond(bob.id, invitation.id, true, &ctx.db_pool)
        .await
        .unwrap();

    assert_eq!(accepted.status, "accepted");
    let session = session.unwrap();
    assert_eq!(session.status, "lobby");
    assert!(!session.ready_a);
    assert!(!session.ready_b);
    // The pair is stored ordered.
    assert!(session.player_a_id < session.player_b_id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_open_session_blocks_reinvite(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.lobby_session(alice.id, bob.id).await;

    // The first invitation is resolved, but the pair still has an open
    // session, so a new invitation conflicts in either direction.
    let err = actions::invite(alice.id, bob.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let err = actions::invite(bob.id, alice.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_invitation_lists(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    ctx.befriend(alice.id, bob.id).await;

    let invitation = actions::invite(alice.id, bob.id, &ctx.db_pool).await.unwrap();

    let sent = actions::get_sent_invitations(alice.id, &ctx.db_pool).await.unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, invitation.id);
    assert_eq!(sent[0].counterpart_username.as_deref(), Some(bob.username.as_str()));

    let received = actions::get_received_invitations(bob.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(
        received[0].counterpart_username.as_deref(),
        Some(alice.username.as_str())
    );

    // Responding clears both lists.
    actions::respond(bob.id, invitation.id, false, &ctx.db_pool)
        .await
        .unwrap();
    assert!(actions::get_sent_invitations(alice.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
    assert!(actions::get_received_invitations(bob.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
}

// =============================================================================
// Lobby and readiness
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_ready_flow_activates_session(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let after_one = actions::mark_ready(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(after_one.status, "lobby");

    // Re-flagging is a no-op, not an error.
    let again = actions::mark_ready(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(again.status, "lobby");

    let after_both = actions::mark_ready(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(after_both.status, "active");
    assert!(after_both.ready_a);
    assert!(after_both.ready_b);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_session_status_is_caller_relative(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    actions::mark_ready(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();

    let for_alice = actions::get_session_status(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert!(for_alice.user_ready);
    assert!(!for_alice.partner_ready);

    let for_bob = actions::get_session_status(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert!(!for_bob.user_ready);
    assert!(for_bob.partner_ready);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_outsider_cannot_touch_session(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let mallory = ctx.player("mallory").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let err = actions::get_session_status(mallory.id, session.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = actions::mark_ready(mallory.id, session.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let err = actions::contribute(
        mallory.id,
        session.id,
        vec!["603".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

// =============================================================================
// Pool
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_pool_is_a_set(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let first = actions::contribute(
        alice.id,
        session.id,
        vec!["101".to_string(), "102".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(first.added, 2);
    assert_eq!(first.pool_size, 2);

    // Overlapping contribution from the partner: only the new item lands.
    let second = actions::contribute(
        bob.id,
        session.id,
        vec!["102".to_string(), "103".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(second.added, 1);
    assert_eq!(second.pool_size, 3);

    // Re-contributing everything is a no-op.
    let third = actions::contribute(
        alice.id,
        session.id,
        vec!["101".to_string(), "102".to_string(), "103".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(third.added, 0);
    assert_eq!(third.pool_size, 3);

    // An empty batch just reports the size.
    let empty = actions::contribute(alice.id, session.id, vec![], &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(empty.added, 0);
    assert_eq!(empty.pool_size, 3);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_blank_item_ref_rejected(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let err = actions::contribute(
        alice.id,
        session.id,
        vec!["  ".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_pool_listing_excludes_decided_items(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(
        alice.id,
        session.id,
        vec!["201".to_string(), "202".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();

    actions::decide(alice.id, session.id, "201", false, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();

    let for_alice = actions::list_pool(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(for_alice.len(), 1);
    assert_eq!(for_alice[0].item_ref, "202");

    // The partner has decided nothing and still sees both.
    let for_bob = actions::list_pool(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(for_bob.len(), 2);
}

// =============================================================================
// Swipes and mutual matches
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_mutual_like_seals_exactly_one_match(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["603".to_string()], &ctx.db_pool)
        .await
        .unwrap();

    let first = actions::decide(alice.id, session.id, "603", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(!first.is_match);

    let second = actions::decide(bob.id, session.id, "603", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(second.is_match);
    assert_eq!(
        second.match_details.as_ref().unwrap().item_ref,
        "603"
    );

    // A repeat like announces nothing new.
    let repeat = actions::decide(bob.id, session.id, "603", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(!repeat.is_match);

    let matches = actions::list_matches(alice.id, session.id, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_ref, "603");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_full_two_player_scenario(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    // Each player stocks the pool during the lobby; B overlaps.
    actions::contribute(
        alice.id,
        session.id,
        vec!["A".to_string(), "B".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    let union = actions::contribute(
        bob.id,
        session.id,
        vec!["B".to_string(), "C".to_string()],
        &ctx.db_pool,
    )
    .await
    .unwrap();
    assert_eq!(union.pool_size, 3);

    actions::mark_ready(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    let active = actions::mark_ready(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(active.status, "active");

    // Opposing swipes: only B is liked by both.
    for (item, liked) in [("A", true), ("B", true), ("C", false)] {
        actions::decide(alice.id, session.id, item, liked, &ctx.db_pool, &NullCatalog)
            .await
            .unwrap();
    }
    let mut sealed = Vec::new();
    for (item, liked) in [("A", false), ("B", true), ("C", true)] {
        let result = actions::decide(bob.id, session.id, item, liked, &ctx.db_pool, &NullCatalog)
            .await
            .unwrap();
        if result.is_match {
            sealed.push(item);
        }
    }
    assert_eq!(sealed, ["B"]);

    let matches = actions::list_matches(alice.id, session.id, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_ref, "B");

    // Both players have swiped everything; the feed is exhausted.
    assert!(actions::list_pool(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
    assert!(actions::list_pool(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap()
        .is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_dislike_blocks_match(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["604".to_string()], &ctx.db_pool)
        .await
        .unwrap();

    actions::decide(alice.id, session.id, "604", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    let result = actions::decide(bob.id, session.id, "604", false, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(!result.is_match);

    let matches = actions::list_matches(alice.id, session.id, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_later_dislike_does_not_retract_match(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["605".to_string()], &ctx.db_pool)
        .await
        .unwrap();
    actions::decide(alice.id, session.id, "605", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    actions::decide(bob.id, session.id, "605", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();

    // Bob changes his mind; the sealed match stays.
    let retraction = actions::decide(bob.id, session.id, "605", false, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert!(!retraction.is_match);

    let matches = actions::list_matches(bob.id, session.id, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_swipe_requires_active_session_and_pool_membership(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["700".to_string()], &ctx.db_pool)
        .await
        .unwrap();

    // Swiping in the lobby is premature.
    let err = actions::decide(alice.id, session.id, "700", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    actions::mark_ready(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    actions::mark_ready(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();

    // Swiping on something outside the pool is a miss, not a vote.
    let err = actions::decide(alice.id, session.id, "999", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

// =============================================================================
// Session lifecycle
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_complete_session(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    let completed = actions::complete_session(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(completed.status, "completed");

    // Completing again is idempotent.
    let again = actions::complete_session(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(again.status, "completed");

    // No more swipes.
    let err = actions::decide(alice.id, session.id, "1", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_complete_requires_active(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    let err = actions::complete_session(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_cancel_session_keeps_matches(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.active_session(alice.id, bob.id).await;

    actions::contribute(alice.id, session.id, vec!["606".to_string()], &ctx.db_pool)
        .await
        .unwrap();
    actions::decide(alice.id, session.id, "606", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    actions::decide(bob.id, session.id, "606", true, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();

    let cancelled = actions::cancel_session(bob.id, session.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");

    // Cancelling twice is a lifecycle error.
    let err = actions::cancel_session(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));

    // Sealed matches survive cancellation.
    let matches = actions::list_matches(alice.id, session.id, &ctx.db_pool, &NullCatalog)
        .await
        .unwrap();
    assert_eq!(matches.len(), 1);

    // Contributions do not.
    let err = actions::contribute(alice.id, session.id, vec!["x".to_string()], &ctx.db_pool)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_closed_session_frees_the_pair(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let session = ctx.lobby_session(alice.id, bob.id).await;

    actions::cancel_session(alice.id, session.id, &ctx.db_pool)
        .await
        .unwrap();

    // A fresh invite/accept cycle works once the old session is closed.
    let invitation = actions::invite(bob.id, alice.id, &ctx.db_pool).await.unwrap();
    let (_, new_session) = actions::respond(alice.id, invitation.id, true, &ctx.db_pool)
        .await
        .unwrap();
    assert!(new_session.is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_active_sessions_list(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let carol = ctx.player("carol").await;

    let with_bob = ctx.lobby_session(alice.id, bob.id).await;
    let with_carol = ctx.lobby_session(alice.id, carol.id).await;

    let sessions = actions::get_active_sessions(alice.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 2);

    actions::cancel_session(alice.id, with_bob.id, &ctx.db_pool)
        .await
        .unwrap();

    let sessions = actions::get_active_sessions(alice.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, with_carol.id);
    assert_eq!(sessions[0].partner_username, carol.username);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_friend_listing(ctx: &TestHarness) {
    let alice = ctx.player("alice").await;
    let bob = ctx.player("bob").await;
    let carol = ctx.player("carol").await;
    ctx.befriend(alice.id, bob.id).await;
    ctx.befriend(carol.id, alice.id).await;

    let friends = actions::get_friends(alice.id, &ctx.db_pool).await.unwrap();
    assert_eq!(friends.len(), 2);
    assert!(friends.iter().any(|f| f.friend_id == bob.id));
    assert!(friends.iter().any(|f| f.friend_id == carol.id));
}
