use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/entries", post(handlers::save_form))
        .route("/entries/:day_key/delete", post(handlers::delete_form))
        .route("/settings/clear", post(handlers::clear_form))
        .route("/settings/seed", post(handlers::seed_form))
        .route("/api/entries", get(handlers::list_entries).post(handlers::create_entry))
        .route("/api/entries/today", get(handlers::get_today))
        .route(
            "/api/entries/:day_key",
            get(handlers::get_entry).delete(handlers::delete_entry),
        )
        .route("/api/trend", get(handlers::get_trend))
        .route("/api/clear", post(handlers::clear))
        .route("/api/seed", post(handlers::seed_api))
        .with_state(state)
}
