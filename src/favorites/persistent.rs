use tokio::sync::{mpsc, oneshot};

use super::{FavoritesDb, FavoritesError, FavoritesStore, MemoryFavorites};
use crate::catalog::Character;

/// Queued write for the background SQLite writer.
enum FavoriteWrite {
    Add(Character),
    Remove(u64),
    /// Acknowledged once every earlier write has been applied.
    Flush(oneshot::Sender<()>),
}

/// Favorites backed by SQLite.
///
/// The in-memory set answers every read and is updated synchronously, so a
/// toggle is visible to the very next query. Writes are queued to a single
/// writer task, which applies them to SQLite in the order they were made.
/// A failed write is logged and does not roll back the in-memory state.
pub struct PersistentFavorites {
    memory: MemoryFavorites,
    writes: mpsc::UnboundedSender<FavoriteWrite>,
}

impl PersistentFavorites {
    /// Load existing favorites and start the writer task.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn load(db: FavoritesDb) -> Result<Self, FavoritesError> {
        let existing = db.load_all().await?;
        tracing::info!(count = existing.len(), "Loaded favorites");

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(db, rx));

        Ok(Self {
            memory: MemoryFavorites::with_favorites(existing),
            writes: tx,
        })
    }

    /// Wait until every write queued so far has reached SQLite.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.writes.send(FavoriteWrite::Flush(ack_tx)).is_err() {
            tracing::warn!("Favorites writer stopped, nothing to flush");
            return;
        }
        let _ = ack_rx.await;
    }

    fn queue(&self, write: FavoriteWrite) {
        if self.writes.send(write).is_err() {
            tracing::error!("Favorites writer stopped, change kept in memory only");
        }
    }
}

impl FavoritesStore for PersistentFavorites {
    fn get_favorites(&self) -> Vec<Character> {
        self.memory.get_favorites()
    }

    fn add_favorite(&self, character: &Character) {
        if self.memory.insert(character) {
            tracing::debug!(id = character.id, name = %character.name, "Added favorite");
            self.queue(FavoriteWrite::Add(character.clone()));
        }
    }

    fn remove_favorite(&self, character: &Character) {
        if self.memory.delete(character) {
            tracing::debug!(id = character.id, name = %character.name, "Removed favorite");
            self.queue(FavoriteWrite::Remove(character.id));
        }
    }
}

async fn run_writer(db: FavoritesDb, mut rx: mpsc::UnboundedReceiver<FavoriteWrite>) {
    while let Some(write) = rx.recv().await {
        match write {
            FavoriteWrite::Add(character) => {
                if let Err(e) = db.insert(&character).await {
                    tracing::error!(id = character.id, error = %e, "Failed to persist favorite");
                }
            }
            FavoriteWrite::Remove(id) => {
                if let Err(e) = db.delete(id).await {
                    tracing::error!(id, error = %e, "Failed to delete persisted favorite");
                }
            }
            FavoriteWrite::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("Favorites writer finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_toggle_visible_before_persisted() {
        let db = FavoritesDb::open(":memory:").await.unwrap();
        let store = PersistentFavorites::load(db).await.unwrap();

        let rick = Character::new(1, "Rick Sanchez");
        store.add_favorite(&rick);
        // No await between write and read
        assert_eq!(store.get_favorites(), vec![rick]);
    }

    #[tokio::test]
    async fn test_writes_reach_sqlite_in_order() {
        let db = FavoritesDb::open(":memory:").await.unwrap();
        let store = PersistentFavorites::load(db.clone()).await.unwrap();

        let rick = Character::new(1, "Rick Sanchez");
        let morty = Character::new(2, "Morty Smith");
        store.add_favorite(&rick);
        store.add_favorite(&morty);
        store.remove_favorite(&rick);
        store.add_favorite(&rick);
        store.remove_favorite(&morty);
        store.flush().await;

        let persisted = db.load_all().await.unwrap();
        assert_eq!(persisted, vec![rick]);
    }

    #[tokio::test]
    async fn test_load_restores_existing() {
        let db = FavoritesDb::open(":memory:").await.unwrap();
        db.insert(&Character::new(42, "Squanchy")).await.unwrap();

        let store = PersistentFavorites::load(db).await.unwrap();
        let ids: Vec<u64> = store.get_favorites().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![42]);
    }

    #[tokio::test]
    async fn test_duplicate_add_queues_nothing() {
        let db = FavoritesDb::open(":memory:").await.unwrap();
        let store = PersistentFavorites::load(db.clone()).await.unwrap();

        let rick = Character::new(1, "Rick Sanchez");
        store.add_favorite(&rick);
        store.add_favorite(&rick);
        store.remove_favorite(&Character::new(7, "Unknown"));
        store.flush().await;

        assert_eq!(db.load_all().await.unwrap().len(), 1);
    }
}
