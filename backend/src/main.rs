use actix_cors::Cors;
use actix_files::Files;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use traveled_backend::handlers;
use traveled_backend::repositories::{SeaOrmShareStore, SeaOrmVisitStore};
use traveled_backend::services::blob_store::LocalBlobStore;
use traveled_backend::state::AppState;
use traveled_backend::utils::{config::Config, db::establish_connection};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file FIRST before anything else
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=================================================");
    println!("🚀 Traveled Backend Server");
    println!("=================================================");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {:#}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ));
        }
    };
    let host = config.host.clone();
    let port = config.port;

    println!("📝 Configuration loaded:");
    println!(
        "   - Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );
    println!("   - Host: {}", host);
    println!("   - Port: {}", port);
    println!("   - Storage: {} ({}/storage)", config.storage_dir, config.public_base_url);
    println!(
        "   - Share rate limit: {} per {}s",
        config.share_rate_limit_max, config.share_rate_limit_window_secs
    );
    println!(
        "   - Log level: {}",
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    );

    print!("🔌 Connecting to database... ");
    let db = establish_connection(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Failed to connect to database: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
        })?;
    println!("✅ Connected!");

    log::info!("Database connection established");

    std::fs::create_dir_all(&config.storage_dir)?;

    // one pool shared by both stores
    let db = Arc::new(db);
    let state = web::Data::new(AppState::new(
        Arc::new(SeaOrmVisitStore::new(Arc::clone(&db))),
        Arc::new(SeaOrmShareStore::new(db)),
        Arc::new(LocalBlobStore::new(&config.storage_dir, &config.public_base_url)),
        &config,
    ));

    println!("🌐 Starting HTTP server at http://{}:{}", host, port);
    println!("📍 Available endpoints:");
    println!("   - GET  http://{}:{}/api/health", host, port);
    println!("   - GET  http://{}:{}/api/regions", host, port);
    println!("   - *    http://{}:{}/api/visits (JWT required)", host, port);
    println!("   - *    http://{}:{}/api/ratings (JWT required)", host, port);
    println!("   - GET  http://{}:{}/api/stats (JWT required)", host, port);
    println!("   - *    http://{}:{}/api/shares (JWT required)", host, port);
    println!("   - GET  http://{}:{}/api/shares/{{code}}", host, port);
    println!("   - GET  http://{}:{}/storage/{{user_id}}/{{file}}", host, port);
    println!("=================================================");

    log::info!("Server started at http://{}:{}", host, port);

    let config = web::Data::new(config);

    HttpServer::new(move || {
        // Strict CORS for the API
        let cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allowed_origin(&config.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .expose_headers(vec!["x-ratelimit-remaining", "x-ratelimit-reset"])
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .wrap(Logger::default())
            // Stored share images can be embedded anywhere
            .service(
                web::scope("/storage")
                    .wrap(Cors::permissive())
                    .service(Files::new("", &config.storage_dir)),
            )
            .service(
                web::scope("")
                    .wrap(cors)
                    .configure(handlers::configure_api),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
