use crate::{
    AppState,
    guard::{RouteRoles, require_roles},
    handlers,
    models::ROLE_ADMIN,
};
use axum::{
    Router,
    routing::{delete, patch, post},
};

const ADMIN_ONLY: RouteRoles = RouteRoles::of(&[ROLE_ADMIN]);

/// Admin Router Module
///
/// Catalog mutations restricted to the `admin` role. Authentication comes from
/// the `auth_middleware` layer `create_router` puts around this router; the
/// role check is attached per route.
pub fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/products/{id}",
        require_roles(patch(handlers::update_product), ADMIN_ONLY)
            .merge(require_roles(delete(handlers::delete_product), ADMIN_ONLY)),
    )
}

/// Dev Router
///
/// Mounted by `create_router` only in `Env::Local`.
pub fn dev_routes() -> Router<AppState> {
    Router::new().route("/seed", post(handlers::run_seed))
}
