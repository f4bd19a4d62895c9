use scorebook::{
    app,
    config::AppConfig,
    persistence::{InMemoryPersistenceSink, PersistenceSink, PostgresPersistenceSink},
    roster::InMemoryRosterProvider,
    scoring::{InMemoryMatchRepository, MatchService},
    AppState,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorebook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scorebook server");
    let config = AppConfig::from_env();

    let sink: Arc<dyn PersistenceSink> = match &config.persistence.database_url {
        Some(database_url) => match connect_postgres(database_url).await {
            Ok(sink) => {
                info!("Persisting to PostgreSQL");
                Arc::new(sink)
            }
            Err(e) => {
                error!(error = %e, "Could not set up PostgreSQL sink");
                return;
            }
        },
        None => {
            info!("DATABASE_URL not set, persisting in memory");
            Arc::new(InMemoryPersistenceSink::new())
        }
    };

    let roster = Arc::new(InMemoryRosterProvider::new());
    let match_service = MatchService::builder(Arc::new(InMemoryMatchRepository::new()))
        .with_roster(roster.clone())
        .with_sink(sink)
        .build();

    let app_state = AppState::new(Arc::new(match_service), roster, config.scoring);
    let router = app(app_state);

    let listener = match tokio::net::TcpListener::bind(&config.server.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, bind_addr = %config.server.bind_addr, "Failed to bind");
            return;
        }
    };
    info!("Server running on http://{}", config.server.bind_addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!(error = %e, "Server stopped with an error");
    }
}

async fn connect_postgres(
    database_url: &str,
) -> Result<PostgresPersistenceSink, scorebook::persistence::PersistenceError> {
    let sink = PostgresPersistenceSink::connect(database_url).await?;
    sink.ensure_schema().await?;
    Ok(sink)
}
