use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{debug, warn};

use super::error::{MongoDaoError, MongoResult};

const MAX_ATTEMPTS: u32 = 10;
const INITIAL_DELAY: Duration = Duration::from_millis(250);
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Build a client and wait until the server answers a ping, backing off exponentially.
pub async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = INITIAL_DELAY;

    loop {
        attempts += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => {
                debug!(attempts, database = database_name, "MongoDB ping succeeded");
                break;
            }
            Err(err) if attempts >= MAX_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts,
                    source: err,
                });
            }
            Err(err) => {
                warn!(attempts, error = %err, "MongoDB ping failed; retrying");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    Ok((client, database))
}
