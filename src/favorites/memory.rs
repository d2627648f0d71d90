use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::FavoritesStore;
use crate::catalog::Character;

/// In-process favorites set.
#[derive(Debug, Default)]
pub struct MemoryFavorites {
    inner: RwLock<Vec<Character>>,
}

impl MemoryFavorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set, e.g. from rows loaded out of SQLite.
    ///
    /// Later duplicates of an id are dropped.
    pub fn with_favorites(characters: Vec<Character>) -> Self {
        let store = Self::new();
        for character in &characters {
            store.insert(character);
        }
        store
    }

    /// Insert and report whether the set changed.
    pub(crate) fn insert(&self, character: &Character) -> bool {
        let mut favorites = self.write();
        if favorites.iter().any(|fav| fav.id == character.id) {
            return false;
        }
        favorites.push(character.clone());
        true
    }

    /// Remove and report whether the set changed.
    pub(crate) fn delete(&self, character: &Character) -> bool {
        let mut favorites = self.write();
        let before = favorites.len();
        favorites.retain(|fav| fav.id != character.id);
        favorites.len() != before
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means a writer panicked mid-push/retain; the Vec
    // itself is still consistent, so keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Character>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Character>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl FavoritesStore for MemoryFavorites {
    fn get_favorites(&self) -> Vec<Character> {
        self.read().clone()
    }

    fn add_favorite(&self, character: &Character) {
        if self.insert(character) {
            tracing::debug!(id = character.id, name = %character.name, "Added favorite");
        }
    }

    fn remove_favorite(&self, character: &Character) {
        if self.delete(character) {
            tracing::debug!(id = character.id, name = %character.name, "Removed favorite");
        }
    }
}
