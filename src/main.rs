use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use reguides_auth::auth::SystemClock;
use reguides_auth::bootstrap::ensure_admin;
use reguides_auth::configuration::get_configuration;
use reguides_auth::scheduler::{BirthdayNotifier, PgBirthdayStore};
use reguides_auth::startup::run;
use reguides_auth::state::AuthState;
use reguides_auth::store::{IdentityStore, PgIdentityStore};
use reguides_auth::telemetry::init_telemetry;

fn startup_error(kind: std::io::ErrorKind, context: &str, e: impl std::fmt::Display) -> std::io::Error {
    tracing::error!(error = %e, "{}", context);
    std::io::Error::new(kind, format!("{}: {}", context, e))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let configuration = get_configuration().map_err(|e| {
        startup_error(std::io::ErrorKind::InvalidInput, "Failed to read configuration", e)
    })?;
    let environment = configuration.application.environment;
    tracing::info!(environment = ?environment, "Configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            startup_error(std::io::ErrorKind::ConnectionRefused, "Failed to connect to database", e)
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        startup_error(std::io::ErrorKind::Other, "Failed to run migrations", e)
    })?;

    let store: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(pool.clone()));

    let state = AuthState::new(&configuration.jwt, environment, store.clone(), Arc::new(SystemClock))
        .map_err(|e| startup_error(std::io::ErrorKind::InvalidInput, "Invalid auth configuration", e))?;
    let policy = state.gate_policy(&configuration.gate);

    if let Some(admin) = &configuration.admin {
        ensure_admin(store.as_ref(), admin)
            .await
            .map_err(|e| startup_error(std::io::ErrorKind::Other, "Admin bootstrap failed", e))?;
    }

    if configuration.scheduler.enabled {
        let birthdays = Arc::new(PgBirthdayStore::new(pool.clone()));
        let notifier = BirthdayNotifier::new(
            birthdays.clone(),
            birthdays,
            configuration.scheduler.utc_offset_hours,
        )
        .map_err(|e| startup_error(std::io::ErrorKind::InvalidInput, "Invalid scheduler configuration", e))?;

        Arc::new(notifier).spawn(Duration::from_secs(configuration.scheduler.interval_seconds.max(1)));
        tracing::info!(
            interval_seconds = configuration.scheduler.interval_seconds,
            "Birthday scheduler started"
        );
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, "Server listening");

    run(listener, state, policy)?.await
}
