//! Session lifecycle actions: status polling, readiness, cancel, complete.

use sqlx::PgPool;
use tracing::info;

use crate::common::{EngineError, PlayerId, SessionId};
use crate::domains::matching::data::{SessionData, SessionStatusData};
use crate::domains::matching::models::{MatchSession, SessionStatus};

/// Load a session and verify the actor is one of its two players.
async fn require_participant(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<MatchSession, EngineError> {
    let session = MatchSession::find_by_id(session_id, pool)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }
    Ok(session)
}

/// Session state from the caller's perspective, for the lobby poll loop.
pub async fn get_session_status(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<SessionStatusData, EngineError> {
    let session = require_participant(actor, session_id, pool).await?;
    let user_ready = session.ready_for(actor);
    let partner_ready = session.ready_for(session.partner_of(actor));
    Ok(SessionStatusData {
        session: session.into(),
        user_ready,
        partner_ready,
    })
}

/// Flag the caller ready. When both players are ready the session flips
/// `lobby -> active`; the flip happens in the model's single guarded UPDATE,
/// so two simultaneous ready calls activate the session exactly once.
/// Re-flagging an already-ready player is a no-op.
pub async fn mark_ready(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<SessionData, EngineError> {
    let session = require_participant(actor, session_id, pool).await?;
    if !session.is_open() {
        return Err(EngineError::InvalidState(format!(
            "Session is {}",
            session.status
        )));
    }

    // The session could close between the check above and the update; the
    // update's status guard catches that and returns no row.
    let updated = MatchSession::mark_ready(session_id, actor, pool)
        .await?
        .ok_or_else(|| EngineError::InvalidState("Session is closed".to_string()))?;

    if updated.is_active() && !session.is_active() {
        info!(%session_id, "Both players ready, session active");
    }
    Ok(updated.into())
}

/// Cancel an open session. Either participant may cancel; sealed matches
/// are kept.
pub async fn cancel_session(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<SessionData, EngineError> {
    let mut tx = pool.begin().await?;

    let session = MatchSession::lock_by_id(session_id, &mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }
    if !session.is_open() {
        return Err(EngineError::InvalidState(format!(
            "Session is already {}",
            session.status
        )));
    }

    let session = MatchSession::set_status(session_id, SessionStatus::Cancelled, &mut *tx).await?;
    tx.commit().await?;

    info!(%session_id, "Session cancelled");
    Ok(session.into())
}

/// End an active session normally. Completing an already-completed session
/// is idempotent; completing a cancelled one is not allowed.
pub async fn complete_session(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<SessionData, EngineError> {
    let mut tx = pool.begin().await?;

    let session = MatchSession::lock_by_id(session_id, &mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }
    if session.status == SessionStatus::Completed.to_string() {
        tx.commit().await?;
        return Ok(session.into());
    }
    if !session.is_active() {
        return Err(EngineError::InvalidState(format!(
            "Session is {}",
            session.status
        )));
    }

    let session = MatchSession::set_status(session_id, SessionStatus::Completed, &mut *tx).await?;
    tx.commit().await?;

    info!(%session_id, "Session completed");
    Ok(session.into())
}
