//! Friends domain - the user/friend directory the invitation manager consults
//!
//! Friend management itself (requests, accept/reject) is plain CRUD owned by
//! the surrounding product; the engine only needs identity lookups and the
//! "are these two an eligible pair" check.

pub mod models;

pub use models::{FriendEntry, Friendship, Player};
