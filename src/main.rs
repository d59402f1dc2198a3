use std::sync::{Arc, Mutex};

use axum::routing::{get, patch, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use urbanfix::config::AppConfig;
use urbanfix::db;
use urbanfix::db::store::{SqliteBookingStore, SqliteSessionStore};
use urbanfix::handlers;
use urbanfix::models::{Role, User};
use urbanfix::services::booking::BookingService;
use urbanfix::services::draft::DraftService;
use urbanfix::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    // Bootstrap the platform admin account on first run.
    {
        let conn = db.lock().unwrap();
        if db::queries::get_user(&conn, "admin")?.is_none() {
            let admin = User {
                id: "admin".to_string(),
                name: "Platform Admin".to_string(),
                phone: String::new(),
                email: String::new(),
                role: Role::Admin,
                worker_profile: None,
            };
            db::queries::save_user(&conn, &admin, &config.admin_token)?;
            tracing::info!("seeded platform admin account");
        }
    }

    let (events_tx, _) = broadcast::channel(256);

    let bookings = BookingService::new(
        Box::new(SqliteBookingStore::new(Arc::clone(&db))),
        events_tx.clone(),
    );
    let drafts = DraftService::new(Box::new(SqliteSessionStore::new(Arc::clone(&db))));

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        bookings,
        drafts,
        events_tx,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/authorize", get(handlers::authorize::authorize))
        .route("/api/bookings", get(handlers::bookings::list))
        .route("/api/bookings", post(handlers::bookings::create))
        .route("/api/bookings/:id", get(handlers::bookings::get))
        .route("/api/bookings/:id/accept", post(handlers::bookings::accept))
        .route("/api/bookings/:id/start", post(handlers::bookings::start))
        .route(
            "/api/bookings/:id/complete",
            post(handlers::bookings::complete),
        )
        .route("/api/bookings/:id/cancel", post(handlers::bookings::cancel))
        .route(
            "/api/bookings/:id/review",
            post(handlers::reviews::create_review),
        )
        .route(
            "/api/admin/bookings/:id/refund",
            post(handlers::bookings::refund),
        )
        .route("/api/complaints", post(handlers::reviews::create_complaint))
        .route(
            "/api/admin/complaints/:id/resolve",
            post(handlers::reviews::resolve_complaint),
        )
        .route(
            "/api/worker/requests",
            get(handlers::bookings::worker_requests),
        )
        .route(
            "/api/worker/requests/:id/dismiss",
            post(handlers::bookings::dismiss_request),
        )
        .route("/api/addresses", get(handlers::addresses::list))
        .route("/api/addresses", post(handlers::addresses::create))
        .route("/api/draft", get(handlers::draft::current))
        .route("/api/draft", patch(handlers::draft::update))
        .route("/api/draft/start", post(handlers::draft::start))
        .route("/api/draft/finalize", post(handlers::draft::finalize))
        .route("/api/draft/abandon", post(handlers::draft::abandon))
        .route("/api/dashboard", get(handlers::dashboard::get))
        .route("/api/events", get(handlers::events::stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
