use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpServer};

use pressdesk::bootstrap;
use pressdesk::config;
use pressdesk::db;
use pressdesk::routes;
use pressdesk::services::Mailer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting Pressdesk server on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Bootstrap: adopt or create the singleton admin credential
    if let Err(e) = bootstrap::seed_admin(&db_pool, &config).await {
        log::error!("Failed to seed admin credential: {}", e);
    }

    // Outbound mail transport, shared by all handlers
    let mailer = Mailer::from_config(&config.smtp);

    if config.cors.allowed_origins.is_empty() {
        log::warn!("ALLOWED_ORIGINS not set, allowing any origin");
    }

    // Clone values for the closure
    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        // CORS allow-list: only the configured frontend origins may call
        // the API from a browser. Requests without an Origin header
        // (curl, server-to-server) are unaffected.
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
            .max_age(3600);

        if config.cors.allowed_origins.is_empty() {
            cors = cors.allow_any_origin();
        } else {
            for origin in &config.cors.allowed_origins {
                cors = cors.allowed_origin(origin);
            }
        }

        App::new()
            // Share database pool, config and mailer with all handlers
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(mailer.clone()))
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(cors)
            // Health check routes
            .service(
                web::scope("/health")
                    .route("", web::get().to(routes::health::liveness))
                    .route("/ready", web::get().to(routes::health::readiness)),
            )
            // Admin auth routes
            .configure(routes::admin::configure)
            // Enquiry routes
            .configure(routes::enquiries::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
