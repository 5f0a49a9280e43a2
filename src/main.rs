use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use heroes_backend::auth::middleware::JwtSecret;
use heroes_backend::config::AppConfig;
use heroes_backend::{connect, handlers};
use migration::{Migrator, MigratorTrait};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = connect(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    tracing::info!("Connected to database");

    if config.run_migrations {
        Migrator::up(&db, None).await.map_err(std::io::Error::other)?;
        tracing::info!("Migrations applied");
    }

    let db_data = web::Data::new(db);
    let policy_data = web::Data::new(config.policy.clone());
    let jwt_secret = web::Data::new(JwtSecret(config.access_token_secret.clone()));
    tracing::info!(policy = ?config.policy, "Lifecycle policy loaded");

    let bind_addr = config.bind_addr();
    tracing::info!("Server running at http://{bind_addr}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(policy_data.clone())
            .app_data(jwt_secret.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::path_config())
            .app_data(handlers::query_config())
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
