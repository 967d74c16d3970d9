//! BugHunt bootstrap: connects the configured store, seeds the corpus and makes sure
//! today's daily challenge exists.

use std::sync::Arc;

use anyhow::Context;
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bughunt_back::{
    config::{AppConfig, StorageBackend},
    dao::game_store::{GameStore, memory::MemoryGameStore},
    services::{
        game_manager::{GameManager, utc_day},
        seed::builtin_files,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let store = connect_store(config.storage).await?;
    store
        .health_check()
        .await
        .context("checking storage health")?;

    let manager = GameManager::from_config(store, &config);
    let seeded = manager
        .corpus()
        .seed(builtin_files())
        .await
        .context("seeding buggy-file corpus")?;

    let today = utc_day(OffsetDateTime::now_utc());
    let daily = manager
        .daily_game(today)
        .await
        .context("ensuring today's daily challenge")?;
    info!(
        instance_id = %daily.instance_id,
        day = %today,
        seeded,
        storage = ?config.storage,
        "daily challenge ready"
    );
    Ok(())
}

async fn connect_store(backend: StorageBackend) -> anyhow::Result<Arc<dyn GameStore>> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryGameStore::new())),
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            use bughunt_back::dao::game_store::mongodb::{MongoConfig, MongoGameStore};

            let config = MongoConfig::from_env()
                .await
                .context("reading MongoDB settings")?;
            let store = MongoGameStore::connect(config)
                .await
                .context("connecting to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            use bughunt_back::dao::game_store::couchdb::{CouchConfig, CouchGameStore};

            let config = CouchConfig::from_env().context("reading CouchDB settings")?;
            let store = CouchGameStore::connect(config)
                .await
                .context("connecting to CouchDB")?;
            Ok(Arc::new(store))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!("storage backend {other:?} is not compiled into this binary"),
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
