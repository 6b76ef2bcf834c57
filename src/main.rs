use std::sync::{Arc, Mutex};

use anyhow::Result;
use log::info;

mod api;
mod config;
mod db;
mod error;
mod render;
mod schema;

#[actix_web::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = config::Config::from_env();

    // Schema init is fatal: refuse to serve requests over a broken store.
    let mut db = db::Db::connect(&config.database_url)?;
    db.ensure_schema()?;
    info!("database ready: {}", config.database_url);

    let db = Arc::new(Mutex::new(db));
    info!("listening on {}", config.listen_addr);
    api::new_http_server(db, &config.listen_addr).await?;
    Ok(())
}
