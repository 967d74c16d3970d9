//! MongoDB-backed [`GameStore`](crate::dao::game_store::GameStore).

mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoGameStore;
