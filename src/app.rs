use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/session", get(handlers::get_session))
        .route("/api/profile", get(handlers::get_profile).put(handlers::put_profile))
        .route("/api/habits", get(handlers::list_habits).post(handlers::add_habit))
        .route("/api/habits/:id", delete(handlers::delete_habit))
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/insights", get(handlers::get_insights))
        .route("/api/chat", get(handlers::get_transcript).post(handlers::chat))
        .with_state(state)
}
