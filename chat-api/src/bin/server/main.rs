use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use chat_api::config::Config;
use chat_api::config::LogFormat;
use chat_api::domain::message::service::MessageService;
use chat_api::domain::user::service::UserService;
use chat_api::inbound::http::router::create_router;
use chat_api::outbound::repositories::PostgresMessageRepository;
use chat_api::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chat_api=debug,tower_http=debug".into());

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::load()?;

    init_tracing(config.logging.format);

    tracing::info!(
        service = "chat-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        password_iterations = config.auth.password_iterations,
        log_format = ?config.logging.format,
        "Configuration loaded"
    );

    let signing_secret = config.auth.signing_secret().map_err(|e| {
        tracing::error!(error = %e, "Signing secret is missing or malformed");
        e
    })?;
    let password_hasher = config.auth.password_hasher();
    let authenticator = Arc::new(Authenticator::new(&signing_secret, password_hasher));
    drop(signing_secret);

    let pg_pool = PgPoolOptions::new()
        .min_connections(0)
        .max_connections(config.database.max_connections)
        .idle_timeout(Duration::from_secs(5 * 60))
        .acquire_timeout(Duration::from_secs(10))
        .max_lifetime(Duration::from_secs(60 * 60))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let message_repository = Arc::new(PostgresMessageRepository::new(pg_pool));

    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repository),
        password_hasher,
    ));
    let message_service = Arc::new(MessageService::new(message_repository, user_repository));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, message_service, authenticator);
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
