use std::time::Duration;

use log::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use migration::{Migrator, MigratorTrait};
use mixtape_server::api::{create_router, AppState};
use mixtape_server::config::Config;
use mixtape_server::logger;
use mixtape_server::storage::UploadStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logger::init().unwrap();

    let config = Config::from_env();

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    let db: DatabaseConnection = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    let uploads = UploadStore::new(&config.upload_path);
    tokio::fs::create_dir_all(uploads.root()).await?;

    let state = AppState {
        db,
        uploads,
        public_url: config.public_url.clone(),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());
    axum::serve(listener, router).await?;

    Ok(())
}
