//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.
//!
//! # Example
//!
//! ```rust
//! use server_core::common::{PlayerId, SessionId};
//!
//! // These are incompatible types - compiler prevents mixing them up
//! let player_id: PlayerId = PlayerId::new();
//! let session_id: SessionId = SessionId::new();
//!
//! // This would be a compile error:
//! // let wrong: SessionId = player_id;
//! ```

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Player entities (users of the match engine).
pub struct Player;

/// Marker type for Invitation entities (pairwise match invitations).
pub struct Invitation;

/// Marker type for MatchSession entities (one pairwise match instance).
pub struct MatchSession;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Player entities.
pub type PlayerId = Id<Player>;

/// Typed ID for Invitation entities.
pub type InvitationId = Id<Invitation>;

/// Typed ID for MatchSession entities.
pub type SessionId = Id<MatchSession>;
