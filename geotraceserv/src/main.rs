mod admin;
mod config;
mod db;
mod error;
mod export;
mod handlers;

use tracing::info;

use actix_web::{
    App,
    HttpServer,
    middleware::{DefaultHeaders, Logger},
};

use std::fs::File;
use std::io::BufReader;

use actix_web::web;
use geotrace::tls::init_rustls_config;
use tracing_appender::non_blocking::WorkerGuard;

use crate::admin::AdminAuth;
use crate::config::ServerConfig;
use crate::handlers::StaticPages;

/// Upper bound on request bodies
pub const MAX_BODY_BYTES: usize = 256 * 1024;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self' https: data:; img-src 'self' https: data:; style-src 'self' 'unsafe-inline' https:; script-src 'self' 'unsafe-inline' https:;";

pub fn configure_routes() -> impl actix_web::dev::HttpServiceFactory {
    web::scope("")
        .route("/", web::get().to(handlers::index))
        .route("/admin", web::get().to(handlers::admin_page))
        .service(
            web::scope("/api")
                .route("/submit", web::post().to(handlers::submit))
                .service(
                    web::scope("/admin")
                        .route("/data", web::get().to(handlers::admin_data))
                        .route("/export.csv", web::get().to(handlers::admin_export_csv))
                        .route("/clear", web::post().to(handlers::admin_clear))
                )
        )
}

/// Headers attached to every response
pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "strict-origin-when-cross-origin"))
        .add(("Permissions-Policy", "geolocation=(self), microphone=(), camera=()"))
        .add(("Content-Security-Policy", CONTENT_SECURITY_POLICY))
}

fn init_tracing(config: &ServerConfig) -> Option<WorkerGuard> {
    if config.server_log {
        let file_appender = tracing_appender::rolling::RollingFileAppender::new(
            tracing_appender::rolling::Rotation::DAILY,
            &config.log_dir,
            "geotrace-server.log"
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(tracing_subscriber::fmt::writer::MakeWriterExt::and(non_blocking, std::io::stdout))
            .with_file(true)
            .with_line_number(true)
            .with_env_filter(config.log_filter.as_str())
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new("%Y-%m-%dT%H:%M:%S".to_string()))
            .init();

        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stdout)
            .with_file(true)
            .with_line_number(true)
            .with_env_filter(config.log_filter.as_str())
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new("%Y-%m-%dT%H:%M:%S".to_string()))
            .init();

        None
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let _guard = init_tracing(&config);

    if config.uses_default_admin_pin() {
        tracing::warn!("⚠️ ADMIN_PIN is not set - using the built-in development pin. Set ADMIN_PIN before exposing this server.");
    }

    // Initialize SQLite database
    let db_pool = db::init::init_db(&config.database_url)
        .map_err(|e| std::io::Error::other(format!("Failed to open database {}: {}", config.database_url, e)))?;

    let added = db::init::run_migrations(&db_pool)
        .map_err(|e| std::io::Error::other(format!("Failed to run database migrations: {}", e)))?;

    tracing::info!("✅ Database initialized at {} ({} columns added)", config.database_url, added);

    let db_data = web::Data::new(db_pool);
    let auth_data = web::Data::new(AdminAuth::new(config.admin_pin.clone()));
    let pages_data = web::Data::new(StaticPages { dir: config.static_dir.clone() });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(db_data.clone())
            .app_data(auth_data.clone())
            .app_data(pages_data.clone())
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .wrap(security_headers())
            .wrap(Logger::default())
            .service(configure_routes())
    });

    let addr = (config.host.as_str(), config.port);

    if config.use_tls {
        info!("Server starting with TLS on https://{}:{}/", config.host, config.port);

        let cert_file = &mut BufReader::new(File::open(&config.tls_cert_path)?);
        let key_file = &mut BufReader::new(File::open(&config.tls_key_path)?);

        let tls_config = init_rustls_config(cert_file, key_file)
            .map_err(std::io::Error::other)?;

        server
            .bind_rustls_0_23(addr, tls_config)?
            .run()
            .await
    } else {
        info!("Server starting on http://{}:{}/", config.host, config.port);

        server
            .bind(addr)?
            .run()
            .await
    }
}
