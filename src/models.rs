use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Roles ---

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_USER: &str = "super-user";
pub const ROLE_USER: &str = "user";

/// Genders accepted on a product.
pub const VALID_GENDERS: [&str; 4] = ["men", "women", "kid", "unisex"];

// --- Credential Store Schemas ---

/// User
///
/// A row of the `users` table. The password hash is loaded alongside the
/// profile but is never serialized; responses go through `UserProfile`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    // Always stored trimmed and lowercased.
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub full_name: String,
    pub is_active: bool,
    // RBAC labels, `["user"]` unless granted more.
    pub roles: Vec<String>,
}

/// UserProfile
///
/// Public view of a user. This is what every auth endpoint returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub roles: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            roles: user.roles,
        }
    }
}

/// AuthResponse
///
/// Profile fields flattened next to a freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

/// RegisterUserRequest
///
/// Input payload for `POST /auth/register`. The plaintext password only lives
/// long enough to be hashed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterUserRequest {
    #[schema(example = "test1@google.com")]
    pub email: String,
    #[schema(example = "Abc123")]
    pub password: String,
    pub full_name: String,
}

impl RegisterUserRequest {
    /// Returns an empty `Vec` if valid; otherwise human-readable messages.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !is_email(&self.email) {
            errors.push("email must be an email".to_string());
        }
        errors.extend(password_errors(&self.password));
        if self.full_name.trim().is_empty() {
            errors.push("fullName must not be empty".to_string());
        }
        errors
    }
}

/// LoginUserRequest
///
/// Input payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginUserRequest {
    pub email: String,
    pub password: String,
}

impl LoginUserRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !is_email(&self.email) {
            errors.push("email must be an email".to_string());
        }
        errors.extend(password_errors(&self.password));
        errors
    }
}

/// PrivateRouteResponse
///
/// Body of the role-gated demonstration routes under `/auth/private*`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PrivateRouteResponse {
    pub ok: bool,
    pub user: UserProfile,
    pub email: String,
}

// --- Catalog Store Schemas ---

/// Product
///
/// A row of the `products` table, without its images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: Uuid,
    // Unique; matched case-insensitively by `find_one`.
    pub title: String,
    pub price: f64,
    pub description: Option<String>,
    // Unique, normalised by `normalize_slug`.
    pub slug: String,
    pub stock: i32,
    pub sizes: Vec<String>,
    pub gender: String,
    pub tags: Vec<String>,
    // Creator of the product; `None` once the creator is gone.
    pub user_id: Option<Uuid>,
}

/// ProductImage
///
/// A row of the `product_images` table. Owned by exactly one product and
/// deleted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductImage {
    pub id: i64,
    pub url: String,
    pub product_id: Uuid,
}

/// ProductWithImages
///
/// The full aggregate as returned by `find_one`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

/// PlainProduct
///
/// The aggregate with its image relation flattened to bare URLs. This is the
/// shape every public catalog endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PlainProduct {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<String>,
}

impl From<ProductWithImages> for PlainProduct {
    fn from(aggregate: ProductWithImages) -> Self {
        Self {
            product: aggregate.product,
            images: aggregate.images.into_iter().map(|image| image.url).collect(),
        }
    }
}

/// CreateProductRequest
///
/// Input payload for `POST /products`. Scalar fields become the product row,
/// `images` becomes one `product_images` row per URL.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateProductRequest {
    #[schema(example = "Mug")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    pub sizes: Vec<String>,
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("title must not be empty".to_string());
        }
        if let Some(price) = self.price {
            if !(price.is_finite() && price > 0.0) {
                errors.push("price must be a positive number".to_string());
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                errors.push("stock must not be negative".to_string());
            }
        }
        if !VALID_GENDERS.contains(&self.gender.as_str()) {
            errors.push(format!("gender must be one of: {}", VALID_GENDERS.join(", ")));
        }
        errors
    }
}

/// UpdateProductRequest
///
/// Partial update payload for `PATCH /products/{id}`. `images: Some(..)`
/// replaces the whole image set; `None` leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProductRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Absent leaves the description alone; `null` clears it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Wraps any value present in the payload, `null` included, in `Some`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl UpdateProductRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                errors.push("title must not be empty".to_string());
            }
        }
        if let Some(price) = self.price {
            if !(price.is_finite() && price > 0.0) {
                errors.push("price must be a positive number".to_string());
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                errors.push("stock must not be negative".to_string());
            }
        }
        if let Some(gender) = &self.gender {
            if !VALID_GENDERS.contains(&gender.as_str()) {
                errors.push(format!("gender must be one of: {}", VALID_GENDERS.join(", ")));
            }
        }
        errors
    }
}

/// Pagination
///
/// Query parameters for `GET /products`.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page size, defaults to 10.
    pub limit: Option<i64>,
    /// Rows to skip, defaults to 0.
    pub offset: Option<i64>,
}

impl Pagination {
    pub const DEFAULT_LIMIT: i64 = 10;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.limit() < 1 {
            errors.push("limit must be a positive number".to_string());
        }
        if self.offset() < 0 {
            errors.push("offset must not be less than 0".to_string());
        }
        errors
    }
}

// --- Helpers ---

/// Normalises a product slug: lowercase, spaces to `_`, apostrophes dropped.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('\'', "")
}

/// Normalises an email for storage and lookup.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_email(raw: &str) -> bool {
    let raw = raw.trim();
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

fn password_errors(password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let len = password.chars().count();
    if !(6..=50).contains(&len) {
        errors.push("password must be between 6 and 50 characters".to_string());
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit_or_symbol = password.chars().any(|c| !c.is_alphabetic());
    if !(has_upper && has_lower && has_digit_or_symbol) {
        errors.push(
            "The password must have a Uppercase, lowercase letter and a number".to_string(),
        );
    }
    errors
}
