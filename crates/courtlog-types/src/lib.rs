//! Foundation types for Courtlog, an athlete's competition journal.
//!
//! The journal is a strict three-level tree owned by one user:
//!
//! ```text
//! User ──owns──▶ Competition ──▶ Match ──▶ Game
//!                    │                       │
//!                 photos                  videos
//! ```
//!
//! Children hold only their parent's id. Parent-to-children lookups are
//! queries against the entity store, never stored back-pointers.
//!
//! # Key Types
//!
//! - [`Competition`], [`Match`], [`Game`] -- the tree nodes
//! - [`CompetitionDetails`], [`MatchDetails`], [`GameDetails`] -- exactly the
//!   fields an update may replace
//! - [`MediaReference`] -- validated `<category>/<id>.<ext>` path of a stored file
//! - [`MediaList`] -- duplicate-free reference list owned by a node
//! - [`Node`], [`NodeKey`], [`ParentKey`] -- kind-erased addressing

pub mod entity;
pub mod enums;
pub mod error;
pub mod ids;
pub mod media;
pub mod node;

pub use entity::{
    Competition, CompetitionDetails, Game, GameDetails, Match, MatchDetails, MediaList, NewUser,
    User,
};
pub use enums::{CompetitionResult, MatchType, Outcome};
pub use error::TypeError;
pub use ids::{CompetitionId, GameId, MatchId, UserId};
pub use media::{MediaCategory, MediaReference};
pub use node::{Node, NodeKey, NodeKind, ParentKey};
