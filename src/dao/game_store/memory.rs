//! Process-local storage backend used for tests and single-node development runs.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use dashmap::{DashMap, mapref::entry::Entry};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::dao::{
    game_store::GameStore,
    models::{BuggyFileEntity, GameFilter, GameInstance, InstanceId},
    storage::{StorageError, StorageResult},
};

/// Failure reported while the memory store is switched offline.
#[derive(Debug, Error)]
#[error("memory store is offline")]
pub struct MemoryStoreOffline;

/// [`GameStore`] keeping every document in concurrent maps.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: DashMap<InstanceId, GameInstance>,
    files: DashMap<String, BuggyFileEntity>,
    offline: AtomicBool,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every operation fails until switched back online.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of persisted game documents.
    pub fn game_count(&self) -> usize {
        self.inner.games.len()
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(
                "memory store offline".into(),
                MemoryStoreOffline,
            ));
        }
        Ok(())
    }
}

impl GameStore for MemoryGameStore {
    fn create_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            match store.inner.games.entry(game.instance_id) {
                Entry::Occupied(_) => Ok(false),
                Entry::Vacant(slot) => {
                    slot.insert(game);
                    Ok(true)
                }
            }
        })
    }

    fn save_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.inner.games.insert(game.instance_id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: InstanceId) -> BoxFuture<'static, StorageResult<Option<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.games.get(&id).map(|entry| entry.value().clone()))
        })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .games
                .iter()
                .filter(|entry| filter.matches(entry.value()))
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn save_buggy_file(&self, file: BuggyFileEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.inner.files.insert(file.id.clone(), file);
            Ok(())
        })
    }

    fn find_buggy_file(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.files.get(&id).map(|entry| entry.value().clone()))
        })
    }

    fn list_buggy_files(&self) -> BoxFuture<'static, StorageResult<Vec<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let mut files: Vec<BuggyFileEntity> = store
                .inner
                .files
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            // Stable order keeps seeded file selection reproducible.
            files.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(files)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GameState, GameStatus, GameType, NimState};
    use uuid::Uuid;

    fn nim(status: GameStatus) -> GameInstance {
        GameInstance {
            instance_id: Uuid::new_v4(),
            game_type: GameType::Nim,
            players: vec![],
            state: GameState::Nim(NimState {
                status,
                winners: None,
                moves: vec![],
                player1: None,
                player2: None,
                remaining_objects: 21,
            }),
        }
    }

    #[tokio::test]
    async fn create_is_insert_only() {
        let store = MemoryGameStore::new();
        let game = nim(GameStatus::WaitingToStart);
        assert!(store.create_game(game.clone()).await.unwrap());

        let mut other = game.clone();
        other.players.push("ada".into());
        assert!(!store.create_game(other.clone()).await.unwrap());
        assert_eq!(store.find_game(game.instance_id).await.unwrap(), Some(game));

        store.save_game(other.clone()).await.unwrap();
        assert_eq!(store.find_game(other.instance_id).await.unwrap(), Some(other));
        assert_eq!(store.game_count(), 1);
    }

    #[tokio::test]
    async fn list_applies_the_filter() {
        let store = MemoryGameStore::new();
        store.save_game(nim(GameStatus::Over)).await.unwrap();
        store.save_game(nim(GameStatus::InProgress)).await.unwrap();

        let over = store
            .list_games(GameFilter {
                game_type: None,
                status: Some(GameStatus::Over),
            })
            .await
            .unwrap();
        assert_eq!(over.len(), 1);
        assert_eq!(over[0].status(), GameStatus::Over);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryGameStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.find_game(Uuid::new_v4()).await,
            Err(StorageError::Unavailable { .. })
        ));
        assert!(store.health_check().await.is_err());

        store.set_offline(false);
        assert!(store.try_reconnect().await.is_ok());
        assert!(store.list_buggy_files().await.unwrap().is_empty());
    }
}
