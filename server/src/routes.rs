//! Router configuration.

use crate::api::{auth, movies, reviews};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use cinereview_auth::UserRepository;
use cinereview_reviews::{CatalogRepository, ReviewRepository};
use cinereview_web::{correlation_id_layer, handlers::health_check};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /api/auth/register`, `POST /api/auth/login`, `GET /api/auth/me`
/// - `GET /api/movies`, `GET /api/movies/:id`, `GET /api/movies/:id/rating`
/// - `GET|POST /api/reviews`, `GET /api/reviews/my`,
///   `GET|PUT|DELETE /api/reviews/:id`
pub fn build_router<U, S>(state: AppState<U, S>) -> Router
where
    U: UserRepository,
    S: ReviewRepository + CatalogRepository,
{
    let api_routes = Router::new()
        // Accounts
        .route("/auth/register", post(auth::register::<U, S>))
        .route("/auth/login", post(auth::login::<U, S>))
        .route("/auth/me", get(auth::me))
        // Catalog
        .route("/movies", get(movies::list_movies::<U, S>))
        .route("/movies/:id", get(movies::get_movie::<U, S>))
        .route("/movies/:id/rating", get(movies::get_movie_rating::<U, S>))
        // Reviews
        .route(
            "/reviews",
            get(reviews::list_reviews::<U, S>).post(reviews::create_review::<U, S>),
        )
        .route("/reviews/my", get(reviews::list_my_reviews::<U, S>))
        .route(
            "/reviews/:id",
            get(reviews::get_review::<U, S>)
                .put(reviews::update_review::<U, S>)
                .delete(reviews::delete_review::<U, S>),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
}
