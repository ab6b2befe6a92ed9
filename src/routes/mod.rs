/// Router Module Index
///
/// Routes are split by who may call them. Access control is applied with
/// router layers, not inside handlers.

/// Anonymous access.
pub mod public;

/// Requires a valid bearer token; some routes also declare roles.
pub mod authenticated;

/// Requires the `admin` role, plus the local-only seed route.
pub mod admin;
