use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoBuggyFileDocument, MongoGameDocument, file_doc_id, filter_document, game_doc_id,
    },
};
use crate::dao::{
    game_store::GameStore,
    models::{BuggyFileEntity, GameFilter, GameInstance, InstanceId},
    storage::{StorageError, StorageResult},
};

const GAME_COLLECTION_NAME: &str = "games";
const FILE_COLLECTION_NAME: &str = "buggyFiles";
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.games().await;
        let index = IndexModel::builder()
            .keys(doc! {"gameType": 1, "state.status": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_type_status_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "gameType,state.status",
                source,
            })?;

        debug!(collection = GAME_COLLECTION_NAME, "MongoDB indexes ensured");
        Ok(())
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn files(&self) -> Collection<MongoBuggyFileDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoBuggyFileDocument>(FILE_COLLECTION_NAME)
    }

    async fn create_game(&self, game: GameInstance) -> MongoResult<bool> {
        let id = game.instance_id;
        let document: MongoGameDocument = game.into();
        let collection = self.games().await;

        match collection.insert_one(&document).await {
            Ok(_) => Ok(true),
            Err(err) if is_duplicate_key(&err) => {
                debug!(game_id = %id, "game already exists; create skipped");
                Ok(false)
            }
            Err(source) => Err(MongoDaoError::CreateGame { id, source }),
        }
    }

    async fn save_game(&self, game: GameInstance) -> MongoResult<()> {
        let id = game.instance_id;
        let document: MongoGameDocument = game.into();
        let collection = self.games().await;
        collection
            .replace_one(game_doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: InstanceId) -> MongoResult<Option<GameInstance>> {
        let collection = self.games().await;

        let document = collection
            .find_one(game_doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        document.map(GameInstance::try_from).transpose()
    }

    async fn list_games(&self, filter: GameFilter) -> MongoResult<Vec<GameInstance>> {
        let collection = self.games().await;

        let documents: Vec<MongoGameDocument> = collection
            .find(filter_document(&filter))
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        let mut games = Vec::with_capacity(documents.len());
        for document in documents {
            match GameInstance::try_from(document) {
                Ok(game) => games.push(game),
                Err(err) => warn!(error = %err, "skipping unreadable game document"),
            }
        }
        Ok(games)
    }

    async fn save_buggy_file(&self, file: BuggyFileEntity) -> MongoResult<()> {
        let id = file.id.clone();
        let document: MongoBuggyFileDocument = file.into();
        let collection = self.files().await;
        collection
            .replace_one(file_doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveBuggyFile { id, source })?;

        Ok(())
    }

    async fn find_buggy_file(&self, id: String) -> MongoResult<Option<BuggyFileEntity>> {
        let collection = self.files().await;

        let document = collection
            .find_one(file_doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadBuggyFile { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn list_buggy_files(&self) -> MongoResult<Vec<BuggyFileEntity>> {
        let collection = self.files().await;

        let documents: Vec<MongoBuggyFileDocument> = collection
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListBuggyFiles { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListBuggyFiles { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::InvalidDocumentId { id, source } => {
                StorageError::malformed(id, source.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}

impl GameStore for MongoGameStore {
    fn create_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(game).await.map_err(Into::into) })
    }

    fn save_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: InstanceId) -> BoxFuture<'static, StorageResult<Option<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(filter).await.map_err(Into::into) })
    }

    fn save_buggy_file(&self, file: BuggyFileEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_buggy_file(file).await.map_err(Into::into) })
    }

    fn find_buggy_file(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_buggy_file(id).await.map_err(Into::into) })
    }

    fn list_buggy_files(&self) -> BoxFuture<'static, StorageResult<Vec<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_buggy_files().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
