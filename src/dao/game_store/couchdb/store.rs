use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::{debug, warn};

use crate::dao::{
    game_store::GameStore,
    models::{BuggyFileEntity, GameFilter, GameInstance, InstanceId},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchBuggyFileDocument, CouchGameDocument, END_SUFFIX, FILE_PREFIX,
        GAME_PREFIX, RevisionOnly, file_doc_id, game_doc_id,
    },
};

#[derive(Clone)]
pub struct CouchGameStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

/// Outcome of a document PUT.
enum PutOutcome {
    Written,
    Conflict,
}

impl CouchGameStore {
    /// Build the HTTP client and make sure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some((ref user, ref pass)) => builder.basic_auth(user.as_ref(), Some(pass.as_ref())),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.with_auth(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                debug!(database = %database, "creating CouchDB database");
                let create = self
                    .with_auth(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreate {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn current_revision(&self, doc_id: &str) -> CouchResult<Option<String>> {
        Ok(self
            .get_document::<RevisionOnly>(doc_id)
            .await?
            .map(|doc| doc.rev))
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<PutOutcome>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(PutOutcome::Conflict),
            status if status.is_success() => Ok(PutOutcome::Written),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// Write `document` over whatever revision is current.
    async fn upsert_document<T>(&self, doc_id: &str, document: T) -> CouchResult<()>
    where
        T: Serialize + WithRevision,
    {
        let rev = self.current_revision(doc_id).await?;
        match self.put_document(doc_id, &document.with_revision(rev)).await? {
            PutOutcome::Written => Ok(()),
            PutOutcome::Conflict => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: StatusCode::CONFLICT,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: row.id,
                    source,
                })?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }
}

trait WithRevision {
    fn with_revision(self, rev: Option<String>) -> Self;
}

impl WithRevision for CouchGameDocument {
    fn with_revision(mut self, rev: Option<String>) -> Self {
        self.rev = rev;
        self
    }
}

impl WithRevision for CouchBuggyFileDocument {
    fn with_revision(mut self, rev: Option<String>) -> Self {
        self.rev = rev;
        self
    }
}

impl GameStore for CouchGameStore {
    fn create_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = game_doc_id(game.instance_id);
            // No revision: CouchDB answers 409 when the id already exists.
            let doc = CouchGameDocument::from((game, None));
            match store.put_document(&doc_id, &doc).await? {
                PutOutcome::Written => Ok(true),
                PutOutcome::Conflict => {
                    debug!(doc_id = %doc_id, "game already exists; create skipped");
                    Ok(false)
                }
            }
        })
    }

    fn save_game(&self, game: GameInstance) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = game_doc_id(game.instance_id);
            let doc = CouchGameDocument::from((game, None));
            store.upsert_document(&doc_id, doc).await.map_err(Into::into)
        })
    }

    fn find_game(&self, id: InstanceId) -> BoxFuture<'static, StorageResult<Option<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = game_doc_id(id);
            let maybe_doc = store.get_document::<CouchGameDocument>(&doc_id).await?;
            Ok(maybe_doc.map(GameInstance::try_from).transpose()?)
        })
    }

    fn list_games(&self, filter: GameFilter) -> BoxFuture<'static, StorageResult<Vec<GameInstance>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchGameDocument>(GAME_PREFIX)
                .await?;
            let mut games = Vec::with_capacity(docs.len());
            for doc in docs {
                match GameInstance::try_from(doc) {
                    Ok(game) if filter.matches(&game) => games.push(game),
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "skipping unreadable game document"),
                }
            }
            Ok(games)
        })
    }

    fn save_buggy_file(&self, file: BuggyFileEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = file_doc_id(&file.id);
            let doc = CouchBuggyFileDocument::from((file, None));
            store.upsert_document(&doc_id, doc).await.map_err(Into::into)
        })
    }

    fn find_buggy_file(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = file_doc_id(&id);
            let maybe_doc = store
                .get_document::<CouchBuggyFileDocument>(&doc_id)
                .await?;
            Ok(maybe_doc.map(BuggyFileEntity::try_from).transpose()?)
        })
    }

    fn list_buggy_files(&self) -> BoxFuture<'static, StorageResult<Vec<BuggyFileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            // `_all_docs` is key-ordered, so the listing is already sorted by id.
            let docs = store
                .list_documents::<CouchBuggyFileDocument>(FILE_PREFIX)
                .await?;
            docs.into_iter()
                .map(|doc| BuggyFileEntity::try_from(doc).map_err(Into::into))
                .collect()
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .with_auth(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
