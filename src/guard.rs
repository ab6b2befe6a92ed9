use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
};

/// RouteRoles
///
/// The set of roles a route accepts. An empty set admits every authenticated
/// user; otherwise the caller needs at least one role in common with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteRoles {
    roles: &'static [&'static str],
}

impl RouteRoles {
    /// Any authenticated user.
    pub const fn any() -> Self {
        Self { roles: &[] }
    }

    pub const fn of(roles: &'static [&'static str]) -> Self {
        Self { roles }
    }

    pub fn roles(&self) -> &'static [&'static str] {
        self.roles
    }
}

/// authorize
///
/// The role check. `user` is the identity established by token validation;
/// it is only consulted when the route actually declares roles.
pub fn authorize(user: Option<&AuthUser>, required: &RouteRoles) -> AppResult<()> {
    if required.roles.is_empty() {
        return Ok(());
    }

    let user = user.ok_or_else(|| AppError::BadGateway("User not found".to_string()))?;

    if user
        .roles
        .iter()
        .any(|role| required.roles.contains(&role.as_str()))
    {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "User {} need a valid role: [{}]",
        user.full_name,
        required.roles.join(",")
    )))
}

/// role_guard
///
/// Middleware form of `authorize`. Must sit inside `auth_middleware` so the
/// `AuthUser` is already in the request extensions.
pub async fn role_guard(
    State(required): State<RouteRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(err) = authorize(request.extensions().get::<AuthUser>(), &required) {
        tracing::warn!(error = %err, roles = ?required.roles(), "access denied");
        return Err(err);
    }
    Ok(next.run(request).await)
}

/// Attaches the role requirement to a single route.
pub fn require_roles(route: MethodRouter<AppState>, required: RouteRoles) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(required, role_guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ROLE_ADMIN, ROLE_SUPER_USER, ROLE_USER};
    use uuid::Uuid;

    fn user_with(roles: &[&str]) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            full_name: "Some One".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn empty_requirement_admits_anyone() {
        assert!(authorize(Some(&user_with(&[])), &RouteRoles::any()).is_ok());
        assert!(authorize(None, &RouteRoles::any()).is_ok());
    }

    #[test]
    fn plain_user_is_forbidden_from_admin_route() {
        let admin_only = RouteRoles::of(&[ROLE_ADMIN]);
        match authorize(Some(&user_with(&[ROLE_USER])), &admin_only) {
            Err(AppError::Forbidden(msg)) => {
                assert!(msg.contains("Some One"));
                assert!(msg.contains("[admin]"));
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
    }

    #[test]
    fn any_overlapping_role_is_enough() {
        let admin_only = RouteRoles::of(&[ROLE_ADMIN]);
        assert!(authorize(Some(&user_with(&[ROLE_USER, ROLE_ADMIN])), &admin_only).is_ok());

        let staff = RouteRoles::of(&[ROLE_ADMIN, ROLE_SUPER_USER]);
        assert!(authorize(Some(&user_with(&[ROLE_SUPER_USER])), &staff).is_ok());
    }

    #[test]
    fn missing_user_on_guarded_route_is_bad_gateway() {
        let err = authorize(None, &RouteRoles::of(&[ROLE_USER])).unwrap_err();
        assert!(matches!(err, AppError::BadGateway(_)));
    }
}
