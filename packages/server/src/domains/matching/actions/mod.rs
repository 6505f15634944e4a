//! Matching domain actions - business logic functions
//!
//! Actions are async functions called directly from route handlers. They
//! enforce participation and lifecycle rules, run the transactional parts
//! under the session row lock, and return wire types or `EngineError`.

mod invitations;
mod lifecycle;
mod pool;
mod preferences;
mod queries;

pub use invitations::{cancel_invitation, invite, respond};
pub use lifecycle::{cancel_session, complete_session, get_session_status, mark_ready};
pub use pool::{contribute, list_pool};
pub use preferences::{decide, list_matches};
pub use queries::{get_active_sessions, get_friends, get_received_invitations, get_sent_invitations};
