use std::sync::Arc;

use campus_api::accounts::postgres::PgAccountStore;
use campus_api::accounts::seed;
use campus_api::accounts::store::AccountStore;
use campus_api::config;
use campus_api::database;
use campus_api::handlers::{router, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    let pool = database::pool()
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
    let store: Arc<dyn AccountStore> = Arc::new(PgAccountStore::new(pool));

    // main_admin is unassignable through the promotion path; seed it here
    // when configured.
    if let (Some(email), Some(password)) = (
        config.seed.main_admin_email.as_deref(),
        config.seed.main_admin_password.as_deref(),
    ) {
        seed::ensure_main_admin(store.as_ref(), email, password, &config.seed.main_admin_name)
            .await
            .unwrap_or_else(|e| panic!("failed to seed main admin: {}", e));
    }

    let app = router(AppState::new(store));

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Campus API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
