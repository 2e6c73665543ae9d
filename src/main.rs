use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use mongodb::Client;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod approximation;
mod average;
mod config;
mod costs;
mod error;
mod schemas;
mod users;

use crate::approximation::ApproximateAverage;
use crate::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .expect("failed to connect");
    let db = web::Data::new(client.database(&config.database));
    info!(database = %config.database, "connected to MongoDB");

    // Built once, outside the factory: every worker shares the same cache.
    let approximation = web::Data::new(Mutex::new(ApproximateAverage::new()));

    let port = config.port;
    info!(port, "listening");
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(db.clone())
            .app_data(approximation.clone())
            .configure(users::routes)
            .configure(costs::routes)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
