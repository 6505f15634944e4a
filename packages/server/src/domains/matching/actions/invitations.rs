//! Invitation actions: send, cancel, respond.

use sqlx::PgPool;
use tracing::info;

use crate::common::{is_unique_violation, EngineError, InvitationId, PlayerId};
use crate::domains::friends::Friendship;
use crate::domains::matching::data::{InvitationData, SessionData};
use crate::domains::matching::models::{Invitation, InvitationStatus, MatchSession};

/// Send a match invitation to a friend.
///
/// Only one pending invitation may exist per pair, in either direction; a
/// duplicate surfaces as `Conflict`. The sender and receiver must already
/// be friends.
pub async fn invite(
    sender_id: PlayerId,
    receiver_id: PlayerId,
    pool: &PgPool,
) -> Result<InvitationData, EngineError> {
    if sender_id == receiver_id {
        return Err(EngineError::InvalidState(
            "Cannot invite yourself".to_string(),
        ));
    }
    if !Friendship::are_friends(sender_id, receiver_id, pool).await? {
        return Err(EngineError::Forbidden(
            "Can only invite friends".to_string(),
        ));
    }
    if MatchSession::open_exists_for_pair(sender_id, receiver_id, pool).await? {
        return Err(EngineError::Conflict(
            "An open session already exists for this pair".to_string(),
        ));
    }

    // No pre-check for an existing pending invitation: the partial unique
    // index is the authority, so a concurrent duplicate cannot slip through.
    let invitation = match Invitation::insert(sender_id, receiver_id, pool).await {
        Ok(i) => i,
        Err(e) if is_unique_violation(&e) => {
            return Err(EngineError::Conflict(
                "A pending invitation already exists for this pair".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    info!(invitation_id = %invitation.id, %sender_id, %receiver_id, "Invitation sent");
    Ok(invitation.into())
}

/// Cancel a pending invitation. Only the sender may cancel.
pub async fn cancel_invitation(
    actor: PlayerId,
    invitation_id: InvitationId,
    pool: &PgPool,
) -> Result<InvitationData, EngineError> {
    let mut tx = pool.begin().await?;

    let invitation = Invitation::lock_by_id(invitation_id, &mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Invitation not found".to_string()))?;

    if invitation.sender_id != actor {
        return Err(EngineError::Forbidden(
            "Only the sender can cancel an invitation".to_string(),
        ));
    }
    if !invitation.is_pending() {
        return Err(EngineError::InvalidState(format!(
            "Invitation is already {}",
            invitation.status
        )));
    }

    let invitation =
        Invitation::set_status(invitation_id, InvitationStatus::Cancelled, &mut *tx).await?;
    tx.commit().await?;

    info!(%invitation_id, "Invitation cancelled");
    Ok(invitation.into())
}

/// Accept or reject a pending invitation. Only the receiver may respond.
///
/// Accepting creates a lobby session for the pair in the same transaction,
/// so a crash cannot leave an accepted invitation without its session. The
/// open-pair unique index turns a second open session into `Conflict` and
/// rolls the acceptance back.
pub async fn respond(
    actor: PlayerId,
    invitation_id: InvitationId,
    accept: bool,
    pool: &PgPool,
) -> Result<(InvitationData, Option<SessionData>), EngineError> {
    let mut tx = pool.begin().await?;

    let invitation = Invitation::lock_by_id(invitation_id, &mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Invitation not found".to_string()))?;

    if invitation.receiver_id != actor {
        return Err(EngineError::Forbidden(
            "Only the receiver can respond to an invitation".to_string(),
        ));
    }
    if !invitation.is_pending() {
        return Err(EngineError::InvalidState(format!(
            "Invitation is already {}",
            invitation.status
        )));
    }

    if !accept {
        let invitation =
            Invitation::set_status(invitation_id, InvitationStatus::Rejected, &mut *tx).await?;
        tx.commit().await?;
        info!(%invitation_id, "Invitation rejected");
        return Ok((invitation.into(), None));
    }

    let updated =
        Invitation::set_status(invitation_id, InvitationStatus::Accepted, &mut *tx).await?;
    let session =
        match MatchSession::insert(invitation.sender_id, invitation.receiver_id, &mut *tx).await {
            Ok(s) => s,
            Err(e) if is_unique_violation(&e) => {
                return Err(EngineError::Conflict(
                    "An open session already exists for this pair".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
    tx.commit().await?;

    info!(%invitation_id, session_id = %session.id, "Invitation accepted, session created");
    Ok((updated.into(), Some(session.into())))
}
