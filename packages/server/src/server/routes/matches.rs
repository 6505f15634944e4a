//! REST surface of the match engine, mounted under `/api/match`.
//!
//! Handlers stay thin: resolve the caller, deserialize the payload, delegate
//! to a domain action, serialize the result. All rule enforcement lives in
//! the actions.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{EngineError, InvitationId, PlayerId, SessionId};
use crate::domains::friends::FriendEntry;
use crate::domains::matching::actions;
use crate::domains::matching::data::{
    ActiveSessionData, ContributionData, DecisionData, InvitationData, MutualMatchData,
    PoolItemData, SessionData, SessionStatusData,
};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthUser;

/// Resolve the authenticated player or reject with 401.
fn require_player(auth: Option<&AuthUser>) -> Result<PlayerId, EngineError> {
    auth.map(|u| u.player_id).ok_or(EngineError::Unauthenticated)
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub receiver_id: PlayerId,
}

#[derive(Debug, Deserialize)]
pub struct CancelInviteRequest {
    pub invitation_id: InvitationId,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub invitation_id: InvitationId,
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct RespondResponse {
    pub invitation: InvitationData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionData>,
}

#[derive(Debug, Deserialize)]
pub struct ContributeRequest {
    pub item_refs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    pub item_ref: String,
    pub liked: bool,
}

pub async fn invite_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Json(req): Json<InviteRequest>,
) -> Result<Json<InvitationData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    let invitation = actions::invite(actor, req.receiver_id, &state.db_pool).await?;
    Ok(Json(invitation))
}

pub async fn cancel_invite_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Json(req): Json<CancelInviteRequest>,
) -> Result<Json<InvitationData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    let invitation = actions::cancel_invitation(actor, req.invitation_id, &state.db_pool).await?;
    Ok(Json(invitation))
}

pub async fn respond_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    let (invitation, session) =
        actions::respond(actor, req.invitation_id, req.accept, &state.db_pool).await?;
    Ok(Json(RespondResponse {
        invitation,
        session,
    }))
}

pub async fn sent_invites_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<InvitationData>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(actions::get_sent_invitations(actor, &state.db_pool).await?))
}

pub async fn received_invites_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<InvitationData>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::get_received_invitations(actor, &state.db_pool).await?,
    ))
}

pub async fn active_sessions_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<ActiveSessionData>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(actions::get_active_sessions(actor, &state.db_pool).await?))
}

pub async fn friends_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
) -> Result<Json<Vec<FriendEntry>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(actions::get_friends(actor, &state.db_pool).await?))
}

pub async fn session_status_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionStatusData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::get_session_status(actor, session_id, &state.db_pool).await?,
    ))
}

pub async fn contribute_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<ContributeRequest>,
) -> Result<Json<ContributionData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::contribute(actor, session_id, req.item_refs, &state.db_pool).await?,
    ))
}

pub async fn pool_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<PoolItemData>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::list_pool(actor, session_id, &state.db_pool).await?,
    ))
}

pub async fn ready_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::mark_ready(actor, session_id, &state.db_pool).await?,
    ))
}

pub async fn decide_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
    Json(req): Json<DecideRequest>,
) -> Result<Json<DecisionData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::decide(
            actor,
            session_id,
            &req.item_ref,
            req.liked,
            &state.db_pool,
            state.catalog.as_ref(),
        )
        .await?,
    ))
}

pub async fn matches_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<Vec<MutualMatchData>>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::list_matches(actor, session_id, &state.db_pool, state.catalog.as_ref()).await?,
    ))
}

pub async fn complete_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::complete_session(actor, session_id, &state.db_pool).await?,
    ))
}

pub async fn cancel_session_handler(
    Extension(state): Extension<AxumAppState>,
    auth: Option<Extension<AuthUser>>,
    Path(session_id): Path<SessionId>,
) -> Result<Json<SessionData>, EngineError> {
    let actor = require_player(auth.as_deref())?;
    Ok(Json(
        actions::cancel_session(actor, session_id, &state.db_pool).await?,
    ))
}
