use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use offerflow::{
    api,
    config::Settings,
    payments::{GatewayRegistry, ProdamusGateway, TinkoffGateway},
    repository,
    service::{CheckoutService, EmailSender, NoopMailer, SmtpMailer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "offerflow=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting offerflow server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let order_repo = Arc::new(repository::SqliteOrderRepository::new(db_pool.clone()));
    let offer_repo = Arc::new(repository::SqliteOfferRepository::new(db_pool.clone()));
    let group_repo = Arc::new(repository::SqliteGroupRepository::new(db_pool.clone()));
    let user_repo = Arc::new(repository::SqliteUserRepository::new(db_pool.clone()));

    // One HTTP client for all outbound gateway calls
    let http = reqwest::Client::new();
    let gateways = GatewayRegistry::new(
        Arc::new(TinkoffGateway::new(
            http.clone(),
            settings.payments.tinkoff_base_url.clone(),
        )),
        Arc::new(ProdamusGateway::new(http)),
    );

    // Outbound email: real SMTP when configured, logged otherwise
    let mailer: Arc<dyn EmailSender> = match SmtpMailer::from_config(&settings.smtp) {
        Some(mailer) => {
            tracing::info!("SMTP email delivery enabled");
            Arc::new(mailer)
        }
        None => {
            tracing::info!("SMTP email delivery disabled");
            Arc::new(NoopMailer)
        }
    };

    let checkout = Arc::new(CheckoutService::new(
        order_repo,
        offer_repo.clone(),
        group_repo,
        user_repo,
        gateways,
        mailer,
    ));

    let app_state = api::state::AppState::new(checkout, offer_repo);
    let app = api::create_app(app_state);

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
