pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    Router,
    routing::{get, post},
};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::Config;
use services::{ChapaClient, Database, EmailSender, PaymentFlow, SmtpSender, TaskQueue};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub payments: PaymentFlow,
    pub queue: TaskQueue,
}

pub struct Application {
    port: u16,
    router: Router,
}

impl Application {
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;

        db.run_migrations().await?;

        let chapa = ChapaClient::new(config.chapa.clone())?;
        if chapa.is_configured() {
            tracing::info!("Chapa client initialized");
        } else {
            tracing::warn!("Chapa secret key not configured - payment features will be limited");
        }

        let payments = PaymentFlow::new(db.clone(), chapa, &config.server);

        // Background task queue: confirmation emails go through here so the
        // booking response never waits on SMTP.
        let (queue, rx) = TaskQueue::new();
        let email: Arc<dyn EmailSender> = Arc::new(SmtpSender::new(config.smtp.clone())?);
        if !email.is_enabled() {
            tracing::warn!("SMTP disabled - booking confirmations will be logged and dropped");
        }
        services::queue::spawn_workers(config.worker.count, rx, email);

        let state = AppState {
            db,
            config: config.clone(),
            payments,
            queue,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            // Payment workflow (exact contract paths, trailing slash included)
            .route("/payments/initiate/", post(handlers::payments::initiate_payment))
            .route("/payments/verify/", post(handlers::payments::verify_payment))
            .route("/payments/success/", get(handlers::payments::payment_success))
            .route("/payments/cancel/", get(handlers::payments::payment_cancel))
            // Read-only payment resources
            .route("/payments", get(handlers::payments::list_payments))
            .route("/payments/:id", get(handlers::payments::get_payment))
            // Listing resources
            .route(
                "/listings",
                get(handlers::listings::list_listings).post(handlers::listings::create_listing),
            )
            .route(
                "/listings/:id",
                get(handlers::listings::get_listing)
                    .put(handlers::listings::update_listing)
                    .delete(handlers::listings::delete_listing),
            )
            // Booking resources
            .route(
                "/bookings",
                get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
            )
            .route(
                "/bookings/:id",
                get(handlers::bookings::get_booking)
                    .put(handlers::bookings::update_booking)
                    .delete(handlers::bookings::delete_booking),
            )
            // Review resources
            .route(
                "/reviews",
                get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
            )
            .route(
                "/reviews/:id",
                get(handlers::reviews::get_review)
                    .put(handlers::reviews::update_review)
                    .delete(handlers::reviews::delete_review),
            )
            .layer(CorsLayer::permissive())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                }),
            )
            .with_state(state);

        Ok(Self {
            port: config.server.port,
            router,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        tracing::info!("Listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}
