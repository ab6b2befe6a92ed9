use uuid::Uuid;

use crate::{
    auth::{AuthUser, issue_token},
    error::{AppError, AppResult},
    models::{
        AuthResponse, LoginUserRequest, ROLE_USER, RegisterUserRequest, User, UserProfile,
        normalize_email,
    },
    password::{hash_password, verify_password},
    repository::Repository,
};

use super::ensure_valid;

fn respond(profile: UserProfile, secret: &str) -> AppResult<AuthResponse> {
    let token = issue_token(profile.id, secret)?;
    Ok(AuthResponse {
        user: profile,
        token,
    })
}

/// register
///
/// Creates an active account with the `user` role and signs the caller in.
/// A taken email surfaces as `AppError::Conflict` carrying the store's detail.
pub async fn register(
    repo: &dyn Repository,
    secret: &str,
    req: RegisterUserRequest,
) -> AppResult<AuthResponse> {
    ensure_valid(req.validate())?;

    let user = User {
        id: Uuid::new_v4(),
        email: normalize_email(&req.email),
        password: hash_password(&req.password)?,
        full_name: req.full_name.trim().to_string(),
        is_active: true,
        roles: vec![ROLE_USER.to_string()],
    };

    let created = repo.create_user(user).await.map_err(|e| {
        tracing::warn!(error = %e, "registration rejected by store");
        AppError::from(e)
    })?;
    tracing::info!(user_id = %created.id, "user registered");

    respond(UserProfile::from(created), secret)
}

/// login
///
/// Status codes differ by failure: an unknown email is 401, while an inactive
/// account or a wrong password is 400.
pub async fn login(
    repo: &dyn Repository,
    secret: &str,
    req: LoginUserRequest,
) -> AppResult<AuthResponse> {
    ensure_valid(req.validate())?;

    let email = normalize_email(&req.email);
    let user = repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Incorrect credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::Validation("Account not active".to_string()));
    }

    if !verify_password(&req.password, &user.password)? {
        tracing::debug!(user_id = %user.id, "password mismatch");
        return Err(AppError::Validation("Incorrect credentials".to_string()));
    }

    respond(UserProfile::from(user), secret)
}

/// Re-issues a token for an already authenticated user.
pub fn check_status(user: &AuthUser, secret: &str) -> AppResult<AuthResponse> {
    respond(user.profile(), secret)
}
