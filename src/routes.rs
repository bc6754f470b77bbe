// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, quiz, stats, topic},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/auth` routes are open; everything under `/quizgenai` requires a
///   bearer token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (store, config, quiz generator).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/google-auth", post(auth::google_auth))
        .route("/del-user", post(auth::delete_user));

    let quiz_routes = Router::new()
        .route("/generate", post(quiz::generate_quiz))
        .route("/quizes", post(quiz::fetch_quiz))
        .route("/save-quiz-result", post(quiz::save_quiz_result))
        .route("/history", post(stats::quiz_history))
        .route("/stats", post(stats::user_stats))
        .route("/popular", get(stats::popular_topics))
        .route("/topics", get(topic::list_topics))
        .route("/favorites", post(topic::toggle_favorite))
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/auth", auth_routes)
        .nest("/quizgenai", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
