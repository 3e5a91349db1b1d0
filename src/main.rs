use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info, warn};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use taskguard::auth::TokenService;
use taskguard::routes;
use taskguard::services::{AccountService, TaskService};
use taskguard::store::{
    self, InMemoryTaskStore, InMemoryUserStore, PgTaskStore, PgUserStore, TaskRepository,
    UserRepository,
};
use taskguard::Config;

async fn build_stores(
    config: &Config,
) -> io::Result<(Arc<dyn UserRepository>, Arc<dyn TaskRepository>)> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; using the in-memory store, data will not survive a restart");
        return Ok((
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemoryTaskStore::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.context_timeout)
        .connect(database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database connection failed: {}", e)))?;

    store::postgres::migrate(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    info!("connected to PostgreSQL");
    Ok((
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgTaskStore::new(pool)),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    info!("loaded configuration: {:?}", config);

    let (users, tasks) = build_stores(&config).await?;
    let tokens = TokenService::new(
        config.access_token_secret.clone(),
        config.access_token_expiry_hours,
    );

    let accounts = web::Data::new(AccountService::new(users, tokens.clone(), config.context_timeout));
    let tasks = web::Data::new(TaskService::new(tasks, config.context_timeout));
    let tokens = web::Data::new(tokens);

    info!("Starting taskguard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(accounts.clone())
            .app_data(tasks.clone())
            .app_data(tokens.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
