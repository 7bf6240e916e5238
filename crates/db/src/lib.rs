pub mod indexes;
pub mod models;

use linguaflow_config::MongoSettings;
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

pub async fn connect(settings: &MongoSettings) -> Result<Database, mongodb::error::Error> {
    let options = ClientOptions::parse(&settings.uri).await?;
    let client = Client::with_options(options)?;
    let db = client.database(&settings.database);
    info!(database = %settings.database, "connected to mongodb");
    Ok(db)
}
