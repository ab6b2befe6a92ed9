use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, TOKEN_TTL},
    error::{AppError, AppResult},
    models::{User, UserProfile},
    repository::{Repository, RepositoryState},
};

/// Claims
///
/// The signed token payload. It identifies the user and nothing else; roles
/// and the active flag are re-read from the Credential Store on every request,
/// so a deactivated account stops working before its token expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's id.
    pub id: Uuid,
    /// Issued At (unix seconds).
    pub iat: usize,
    /// Expiration Time (unix seconds). Always `iat + TOKEN_TTL`.
    pub exp: usize,
}

/// Signs a token for `user_id`, valid for `TOKEN_TTL`.
pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        id: user_id,
        iat: now,
        exp: now + TOKEN_TTL.as_secs() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("jwt encode: {e}")))
}

/// verify_token
///
/// The token-verification strategy: checks signature and expiry with
/// `secret` and returns the user id the token was issued for.
pub fn verify_token(token: &str, secret: &str) -> AppResult<Uuid> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Ok(data.claims.id),
        Err(e) => {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "Token expired",
                _ => "Invalid token",
            };
            tracing::debug!(error = %e, "token rejected");
            Err(AppError::Unauthorized(reason.to_string()))
        }
    }
}

/// Pulls the credential out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// AuthUser
///
/// The resolved identity of an authenticated request. It is inserted into the
/// request extensions by `auth_middleware` and read back by handlers and by
/// the role guard, so the token is validated once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            // Inactive users never get this far.
            is_active: true,
            roles: self.roles.clone(),
        }
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            roles: user.roles,
        }
    }
}

/// authenticate
///
/// Full token validation: bearer extraction, signature and expiry check,
/// then a Credential Store lookup. A token for a user that no longer exists
/// or has been deactivated is rejected with 401.
pub async fn authenticate(
    repo: &dyn Repository,
    secret: &str,
    headers: &HeaderMap,
) -> AppResult<AuthUser> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let user_id = verify_token(token, secret)?;

    let user = repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Incorrect credentials".to_string()))?;

    if !user.is_active {
        return Err(AppError::Unauthorized("Account not active".to_string()));
    }

    Ok(AuthUser::from(user))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `auth_middleware` for this request.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let user = authenticate(repo.as_ref(), &config.jwt_secret, &parts.headers).await?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// auth_middleware
///
/// Enforces authentication for a router. The `AuthUser` extractor rejects
/// with 401 before the handler runs; on success the identity is attached to
/// the request so the role guard and the handler can read it.
pub async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    tracing::debug!(user_id = %auth_user.id, "request authenticated");
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}
