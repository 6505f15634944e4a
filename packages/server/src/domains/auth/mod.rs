//! Auth domain - player identity via JWT
//!
//! Account registration and login live in the surrounding product; the match
//! engine only verifies tokens and reads the player id out of them.

pub mod jwt;

pub use jwt::{Claims, JwtService};
