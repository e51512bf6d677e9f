use actix_web::{web, App, HttpServer};
use card_analyzer::blob::LocalBlobStore;
use card_analyzer::config::Config;
use card_analyzer::pipeline::store;
use card_analyzer::services;
use card_analyzer::services::cards::JSON_LIMIT;
use card_analyzer::state::AppState;
use env_logger::Env;
use log::{error, info};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    // Schema is created once at startup; handlers only open connections.
    {
        let conn = store::open(&config.db_path).map_err(io::Error::other)?;
        store::migrate(&conn).map_err(io::Error::other)?;
    }
    info!("Using database {}", config.db_path.display());

    let blobs = Arc::new(LocalBlobStore::new(config.blob_dir.clone()));
    let state = AppState::new(&config, blobs);

    info!("Server running at {}", config.bind_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .app_data(web::Data::new(state.clone()))
            .service(services::cards::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
