use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a bearer token: account creation, login and
/// read-only catalog access.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .route("/auth/register", post(handlers::register_user))
        .route("/auth/login", post(handlers::login_user))
        // GET /products?limit=&offset=
        .route("/products", get(handlers::get_products))
        // GET /products/{term}
        // The segment is an id, a slug or a title. It shares the `{id}` name with
        // the admin routes on the same path.
        .route("/products/{id}", get(handlers::get_product))
}
