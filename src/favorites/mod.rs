//! Favorited characters.
//!
//! The list core talks to favorites through [`FavoritesStore`]: reads are
//! synchronous snapshots, writes are fire-and-forget. Two implementations
//! live here:
//!
//! - [`MemoryFavorites`] - process-local set, used on its own in tests
//! - [`PersistentFavorites`] - memory set plus an ordered SQLite writer

mod db;
mod memory;
mod persistent;

pub use db::{FavoritesDb, FavoritesError};
pub use memory::MemoryFavorites;
pub use persistent::PersistentFavorites;

use crate::catalog::Character;

/// Externally owned set of favorite characters, keyed by `id`.
///
/// Other surfaces may mutate the store at any time, so callers must not cache
/// what [`get_favorites`](Self::get_favorites) returns beyond the query at hand.
pub trait FavoritesStore: Send + Sync {
    /// Current favorites, in the order they were added.
    fn get_favorites(&self) -> Vec<Character>;

    /// Mark a character as favorite. Adding an existing favorite is a no-op.
    fn add_favorite(&self, character: &Character);

    /// Drop a character from favorites. Unknown ids are ignored.
    fn remove_favorite(&self, character: &Character);
}
