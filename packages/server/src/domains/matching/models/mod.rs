pub mod invitation;
pub mod mutual_match;
pub mod pool_item;
pub mod preference;
pub mod session;

pub use invitation::{Invitation, InvitationEntry, InvitationStatus};
pub use mutual_match::MutualMatch;
pub use pool_item::PoolItem;
pub use preference::Preference;
pub use session::{MatchSession, SessionEntry, SessionStatus};
