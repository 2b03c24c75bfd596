//! API route definitions and router builder.

pub mod analysis;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod engineers;
pub mod health;
pub mod roster;
pub mod vehicles;

use axum::Router;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Chat
        .route("/chat", post(chat::chat))
        // Batch reconciliation
        .route("/engineers", get(engineers::engineers_with_scores))
        .route("/engineers/locations", get(engineers::engineer_locations))
        // Dashboard
        .route("/dashboard/summary", get(dashboard::vehicle_summary))
        .route(
            "/dashboard/vehicles/{status}",
            get(dashboard::vehicles_by_status),
        )
        .route(
            "/dashboard/vehicles-mot-due",
            get(dashboard::vehicles_mot_due),
        )
        .route(
            "/dashboard/vehicles-tax-due",
            get(dashboard::vehicles_tax_due),
        )
        // Vehicles
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/search", get(vehicles::search_vehicles))
        .route("/vehicles/lookup/{van}", get(vehicles::lookup_vehicle))
        // Roster
        .route("/roster/report", post(roster::roster_report))
        // Vision analysis
        .route("/analysis", post(analysis::analyze_vehicle))
        // Sessions
        .route("/auth/session", post(auth::create_session))
        .route("/auth/session/{id}", get(auth::get_session))
        .route("/auth/verify/{id}", get(auth::verify_session))
        .route("/auth/logout/{id}", post(auth::logout));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}
