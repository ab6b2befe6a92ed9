//! Request-independent business logic. Handlers parse and authorize, then call
//! into these modules with a `&dyn Repository`.

pub mod auth;
pub mod products;
pub mod seed;

use crate::error::{AppError, AppResult};

/// Turns the messages collected by a request's `validate()` into a 400.
pub(crate) fn ensure_valid(errors: Vec<String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}
