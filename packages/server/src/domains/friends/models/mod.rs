pub mod friendship;
pub mod player;

pub use friendship::{FriendEntry, Friendship};
pub use player::Player;
