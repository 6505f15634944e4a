//! Candidate pool actions: contribute and browse.

use sqlx::PgPool;
use tracing::info;

use crate::common::{EngineError, PlayerId, SessionId};
use crate::domains::matching::data::{ContributionData, PoolItemData};
use crate::domains::matching::models::{MatchSession, PoolItem};

/// Union a batch of item refs into the session's shared pool.
///
/// The pool is a set, so re-contributing an item (by either player) is a
/// no-op; an empty batch just reports the current pool size. Contributions
/// are accepted while the session is open, lobby included, so players can
/// stock the pool before both are ready.
pub async fn contribute(
    actor: PlayerId,
    session_id: SessionId,
    item_refs: Vec<String>,
    pool: &PgPool,
) -> Result<ContributionData, EngineError> {
    if item_refs.iter().any(|r| r.trim().is_empty()) {
        return Err(EngineError::InvalidState(
            "Item refs must be non-blank".to_string(),
        ));
    }

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
            "Session is {}",
            session.status
        )));
    }

    let added = if item_refs.is_empty() {
        0
    } else {
        PoolItem::contribute(session_id, actor, &item_refs, &mut *tx).await?
    };
    let pool_size = PoolItem::count_for_session(session_id, &mut *tx).await?;
    tx.commit().await?;

    info!(%session_id, added, pool_size, "Pool contribution");
    Ok(ContributionData { added, pool_size })
}

/// Pool items the caller has not yet swiped on.
pub async fn list_pool(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
) -> Result<Vec<PoolItemData>, EngineError> {
    let session = MatchSession::find_by_id(session_id, pool)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }

    let items = PoolItem::list_undecided_for_player(session_id, actor, pool).await?;
    Ok(items.into_iter().map(Into::into).collect())
}
