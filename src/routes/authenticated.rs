use crate::{
    AppState,
    guard::{RouteRoles, require_roles},
    handlers,
    models::{ROLE_ADMIN, ROLE_SUPER_USER, ROLE_USER},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes open to any holder of a valid token, plus the role-gated
/// demonstration routes. `create_router` wraps this router in
/// `auth_middleware`; each route then carries its own `RouteRoles`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route(
            "/auth/check-status",
            require_roles(get(handlers::check_status), RouteRoles::any()),
        )
        .route(
            "/auth/private",
            require_roles(
                get(handlers::private_route),
                RouteRoles::of(&[ROLE_ADMIN, ROLE_SUPER_USER]),
            ),
        )
        .route(
            "/auth/private2",
            require_roles(get(handlers::private_route2), RouteRoles::of(&[ROLE_USER])),
        )
        .route(
            "/auth/private3",
            require_roles(get(handlers::private_route3), RouteRoles::of(&[ROLE_ADMIN])),
        )
        // POST /products
        // Any authenticated user; the caller is recorded as the creator.
        .route(
            "/products",
            require_roles(post(handlers::create_product), RouteRoles::any()),
        )
}
