//! Wire types for the match engine's REST surface.
//!
//! Models stay internal to the domain; these are the shapes handed to
//! clients. Conversions are lossless except where a view deliberately drops
//! the partner's perspective (ready flags become you/partner).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{InvitationId, PlayerId, SessionId};
use crate::domains::matching::models::{
    Invitation, InvitationEntry, MatchSession, MutualMatch, PoolItem, SessionEntry,
};
use crate::kernel::CatalogTitle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationData {
    pub id: InvitationId,
    pub sender_id: PlayerId,
    pub receiver_id: PlayerId,
    pub status: String,
    /// Username of the other side of the invitation; present in list views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterpart_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationData {
    fn from(i: Invitation) -> Self {
        Self {
            id: i.id,
            sender_id: i.sender_id,
            receiver_id: i.receiver_id,
            status: i.status,
            counterpart_username: None,
            created_at: i.created_at,
        }
    }
}

impl From<InvitationEntry> for InvitationData {
    fn from(i: InvitationEntry) -> Self {
        Self {
            id: i.id,
            sender_id: i.sender_id,
            receiver_id: i.receiver_id,
            status: i.status,
            counterpart_username: Some(i.counterpart_username),
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub id: SessionId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub status: String,
    pub ready_a: bool,
    pub ready_b: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MatchSession> for SessionData {
    fn from(s: MatchSession) -> Self {
        Self {
            id: s.id,
            player_a_id: s.player_a_id,
            player_b_id: s.player_b_id,
            status: s.status,
            ready_a: s.ready_a,
            ready_b: s.ready_b,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Session as shown in the caller's active-sessions list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveSessionData {
    pub id: SessionId,
    pub status: String,
    pub partner_id: PlayerId,
    pub partner_username: String,
    pub created_at: DateTime<Utc>,
}

impl From<SessionEntry> for ActiveSessionData {
    fn from(s: SessionEntry) -> Self {
        Self {
            id: s.id,
            status: s.status,
            partner_id: s.partner_id,
            partner_username: s.partner_username,
            created_at: s.created_at,
        }
    }
}

/// Poll view of a session from one participant's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusData {
    pub session: SessionData,
    pub user_ready: bool,
    pub partner_ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolItemData {
    pub item_ref: String,
    pub contributed_by: PlayerId,
    pub created_at: DateTime<Utc>,
}

impl From<PoolItem> for PoolItemData {
    fn from(i: PoolItem) -> Self {
        Self {
            item_ref: i.item_ref,
            contributed_by: i.contributed_by,
            created_at: i.created_at,
        }
    }
}

/// Outcome of a pool contribution: how many items were new, and the pool
/// size after the union.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionData {
    pub added: u64,
    pub pool_size: i64,
}

/// Catalog metadata attached to a match when the title catalog knows the
/// item. Absent for unknown refs or when no catalog is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTitleData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
}

impl From<CatalogTitle> for MatchTitleData {
    fn from(t: CatalogTitle) -> Self {
        Self {
            title: t.title,
            overview: t.overview,
            poster_path: t.poster_path,
            release_date: t.release_date,
            vote_average: t.vote_average,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualMatchData {
    pub item_ref: String,
    pub matched_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MatchTitleData>,
}

impl From<MutualMatch> for MutualMatchData {
    fn from(m: MutualMatch) -> Self {
        Self {
            item_ref: m.item_ref,
            matched_at: m.matched_at,
            details: None,
        }
    }
}

/// Outcome of a swipe: whether it sealed a mutual match, and the match
/// record if so.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionData {
    pub is_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_details: Option<MutualMatchData>,
}
