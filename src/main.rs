//! Report access server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use pbi_access_lib::config::Config;
use pbi_access_lib::db::DbPool;
use pbi_access_lib::middleware::RequestLogger;
use pbi_access_lib::services::DingTalkClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            eprintln!();
            eprintln!("Please check your environment variables:");
            eprintln!("  - RUST_ENV must be set to 'development' or 'production'");
            eprintln!("  - In production, DATABASE_URL and DingTalk credentials must be set");
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("========================================");
    info!("  Report Access Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }
    if !config.dingtalk.is_configured() {
        warn!("DingTalk credentials not set; login is disabled");
    }

    let pool = match DbPool::new(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let dingtalk = match DingTalkClient::new(config.dingtalk.clone()) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to initialize DingTalk client: {}", e);
            std::process::exit(1);
        }
    };

    let bind_address = config.bind_address();
    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let pool = web::Data::new(pool);
    let dingtalk = web::Data::new(dingtalk);
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        // Credentialed CORS for the configured front-end origins
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            // Add CORS middleware (must be before other middleware)
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(pool.clone())
            .app_data(dingtalk.clone())
            .app_data(config.clone())
            .configure(pbi_access_lib::configure_app)
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
