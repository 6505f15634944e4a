//! Query actions for the dashboard's poll loop.
//!
//! Query actions return data directly; they hold no locks and run against
//! the pool.

use sqlx::PgPool;

use crate::common::{EngineError, PlayerId};
use crate::domains::friends::{FriendEntry, Friendship};
use crate::domains::matching::data::{ActiveSessionData, InvitationData};
use crate::domains::matching::models::{Invitation, MatchSession};

/// Pending invitations the player has sent.
pub async fn get_sent_invitations(
    actor: PlayerId,
    pool: &PgPool,
) -> Result<Vec<InvitationData>, EngineError> {
    let rows = Invitation::list_sent(actor, pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Pending invitations waiting on the player.
pub async fn get_received_invitations(
    actor: PlayerId,
    pool: &PgPool,
) -> Result<Vec<InvitationData>, EngineError> {
    let rows = Invitation::list_received(actor, pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Open sessions the player is part of.
pub async fn get_active_sessions(
    actor: PlayerId,
    pool: &PgPool,
) -> Result<Vec<ActiveSessionData>, EngineError> {
    let rows = MatchSession::list_open_for_player(actor, pool).await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Friends eligible for an invitation.
pub async fn get_friends(actor: PlayerId, pool: &PgPool) -> Result<Vec<FriendEntry>, EngineError> {
    Friendship::list_for_user(actor, pool).await.map_err(Into::into)
}
