#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{BuggyFileEntity, GameFilter, GameInstance, InstanceId};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer for game instances and the buggy-file corpus.
pub trait GameStore: Send + Sync {
    /// Insert a new instance; resolves to `false` when the id is already taken.
    fn create_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<bool>>;
    /// Upsert an instance by id.
    fn save_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: InstanceId) -> BoxFuture<'static, StorageResult<Option<GameInstance>>>;
    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameInstance>>>;
    fn save_buggy_file(&self, file: BuggyFileEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_buggy_file(&self, id: String)
    -> BoxFuture<'static, StorageResult<Option<BuggyFileEntity>>>;
    fn list_buggy_files(&self) -> BoxFuture<'static, StorageResult<Vec<BuggyFileEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
