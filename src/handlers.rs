use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    extract::{ValidJson, ValidQuery},
    models::{
        AuthResponse, CreateProductRequest, LoginUserRequest, Pagination, PlainProduct,
        PrivateRouteResponse, RegisterUserRequest, UpdateProductRequest,
    },
    services,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Parses a `{id}` path segment that must be a product id.
fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation("Validation failed (uuid is expected)".to_string()))
}

// --- Auth ---

/// register_user
///
/// [Public Route] Creates an account with the `user` role and returns its
/// profile alongside a bearer token.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid input or email already taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response =
        services::auth::register(state.repo.as_ref(), &state.config.jwt_secret, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// login_user
///
/// [Public Route] Exchanges email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginUserRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Wrong password or inactive account"),
        (status = 401, description = "Unknown email")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginUserRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response =
        services::auth::login(state.repo.as_ref(), &state.config.jwt_secret, payload).await?;
    Ok(Json(response))
}

/// check_status
///
/// [Authenticated Route] Returns the caller's profile with a fresh token.
#[utoipa::path(
    get,
    path = "/auth/check-status",
    responses(
        (status = 200, description = "Refreshed", body = AuthResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn check_status(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(services::auth::check_status(&user, &state.config.jwt_secret)?))
}

fn private_response(user: AuthUser) -> Json<PrivateRouteResponse> {
    Json(PrivateRouteResponse {
        ok: true,
        user: user.profile(),
        email: user.email,
    })
}

/// [Authenticated Route] Requires `admin` or `super-user`.
#[utoipa::path(
    get,
    path = "/auth/private",
    responses(
        (status = 200, description = "Granted", body = PrivateRouteResponse),
        (status = 403, description = "Missing role")
    )
)]
pub async fn private_route(user: AuthUser) -> Json<PrivateRouteResponse> {
    private_response(user)
}

/// [Authenticated Route] Requires `user`.
#[utoipa::path(
    get,
    path = "/auth/private2",
    responses(
        (status = 200, description = "Granted", body = PrivateRouteResponse),
        (status = 403, description = "Missing role")
    )
)]
pub async fn private_route2(user: AuthUser) -> Json<PrivateRouteResponse> {
    private_response(user)
}

/// [Authenticated Route] Requires `admin`.
#[utoipa::path(
    get,
    path = "/auth/private3",
    responses(
        (status = 200, description = "Granted", body = PrivateRouteResponse),
        (status = 403, description = "Missing role")
    )
)]
pub async fn private_route3(user: AuthUser) -> Json<PrivateRouteResponse> {
    private_response(user)
}

// --- Products ---

/// create_product
///
/// [Authenticated Route] Creates a product owned by the caller.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created", body = PlainProduct),
        (status = 400, description = "Invalid input or duplicate title/slug")
    )
)]
pub async fn create_product(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<PlainProduct>)> {
    let product = services::products::create(state.repo.as_ref(), payload, &user).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// get_products
///
/// [Public Route] One page of the catalog, images flattened to URLs.
#[utoipa::path(
    get,
    path = "/products",
    params(Pagination),
    responses((status = 200, description = "Page of products", body = [PlainProduct]))
)]
pub async fn get_products(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<Pagination>,
) -> AppResult<Json<Vec<PlainProduct>>> {
    Ok(Json(services::products::find_all(state.repo.as_ref(), page).await?))
}

/// get_product
///
/// [Public Route] Looks a product up by id, slug or title.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id, slug or title")),
    responses(
        (status = 200, description = "Found", body = PlainProduct),
        (status = 404, description = "No product matches the term")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> AppResult<Json<PlainProduct>> {
    Ok(Json(
        services::products::find_one_plain(state.repo.as_ref(), &term).await?,
    ))
}

/// update_product
///
/// [Admin Route] Partial update. A supplied `images` list replaces the
/// stored set in the same transaction as the product row.
#[utoipa::path(
    patch,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated", body = PlainProduct),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateProductRequest>,
) -> AppResult<Json<PlainProduct>> {
    let id = parse_id(&id)?;
    Ok(Json(
        services::products::update(state.repo.as_ref(), id, payload).await?,
    ))
}

/// delete_product
///
/// [Admin Route] Deletes the product and its images.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    services::products::remove(state.repo.as_ref(), id).await?;
    Ok(StatusCode::OK)
}

// --- Seed ---

/// run_seed
///
/// [Local Only] Wipes users and products and reloads the fixtures.
#[utoipa::path(
    post,
    path = "/seed",
    responses((status = 200, description = "Seed executed", body = String))
)]
pub async fn run_seed(State(state): State<AppState>) -> AppResult<&'static str> {
    services::seed::run_seed(state.repo.clone()).await
}
