//! Swipe recording and mutual-match reads.

use sqlx::PgPool;
use tracing::info;

use crate::common::{EngineError, PlayerId, SessionId};
use crate::domains::matching::data::{DecisionData, MutualMatchData};
use crate::domains::matching::models::{MatchSession, MutualMatch, PoolItem, Preference};
use crate::kernel::BaseCatalog;

/// Record a swipe and seal a mutual match if this one completes it.
///
/// The whole decision runs in one transaction that locks the session row
/// first, so concurrent swipes in the same session serialize. Sealing goes
/// through an insert-if-absent, which makes `is_match` true for exactly one
/// swipe per (session, item) even if both players like it at once.
///
/// A dislike after a match was sealed overwrites the preference but never
/// retracts the match.
pub async fn decide(
    actor: PlayerId,
    session_id: SessionId,
    item_ref: &str,
    liked: bool,
    pool: &PgPool,
    catalog: &dyn BaseCatalog,
) -> Result<DecisionData, EngineError> {
    let mut tx = pool.begin().await?;

    let session = MatchSession::lock_by_id(session_id, &mut *tx)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }
    if session.is_lobby() {
        return Err(EngineError::InvalidState(
            "Session has not started".to_string(),
        ));
    }
    if !session.is_active() {
        return Err(EngineError::InvalidState(format!(
            "Session is {}",
            session.status
        )));
    }
    if !PoolItem::exists(session_id, item_ref, &mut *tx).await? {
        return Err(EngineError::NotFound(
            "Item is not in the session pool".to_string(),
        ));
    }

    Preference::upsert(session_id, actor, item_ref, liked, &mut *tx).await?;

    let partner = session.partner_of(actor);
    let sealed = if liked && Preference::has_liked(session_id, partner, item_ref, &mut *tx).await? {
        MutualMatch::insert_if_absent(session_id, item_ref, &mut *tx).await?
    } else {
        None
    };
    tx.commit().await?;

    let Some(matched) = sealed else {
        return Ok(DecisionData {
            is_match: false,
            match_details: None,
        });
    };
    info!(%session_id, item_ref, "Mutual match sealed");

    // Metadata lookup happens after commit: the match is durable whether or
    // not the catalog answers.
    let details = catalog.lookup(item_ref).await?.map(Into::into);
    let mut data = MutualMatchData::from(matched);
    data.details = details;
    Ok(DecisionData {
        is_match: true,
        match_details: Some(data),
    })
}

/// All mutual matches for a session, oldest first, decorated with catalog
/// metadata where available.
pub async fn list_matches(
    actor: PlayerId,
    session_id: SessionId,
    pool: &PgPool,
    catalog: &dyn BaseCatalog,
) -> Result<Vec<MutualMatchData>, EngineError> {
    let session = MatchSession::find_by_id(session_id, pool)
        .await?
        .ok_or_else(|| EngineError::NotFound("Session not found".to_string()))?;
    if !session.is_participant(actor) {
        return Err(EngineError::Forbidden(
            "Not a participant in this session".to_string(),
        ));
    }

    let matches = MutualMatch::list_for_session(session_id, pool).await?;
    let mut out = Vec::with_capacity(matches.len());
    for m in matches {
        let details = catalog.lookup(&m.item_ref).await?.map(Into::into);
        let mut data = MutualMatchData::from(m);
        data.details = details;
        out.push(data);
    }
    Ok(out)
}
