pub mod id;

pub use id::{EntryId, TeamId, UserId};
