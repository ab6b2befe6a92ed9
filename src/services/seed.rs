use tokio::task::JoinSet;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::User,
    password::hash_password,
    repository::RepositoryState,
    seed_data::{PRODUCTS, USERS},
};

use super::products;

pub const SEED_DONE: &str = "Seed executed";

/// run_seed
///
/// Wipes both stores and reloads the fixtures. Not atomic as a whole: each
/// product insert commits on its own, and they run concurrently.
pub async fn run_seed(repo: RepositoryState) -> AppResult<&'static str> {
    let products_removed = products::delete_all(repo.as_ref()).await?;
    let users_removed = repo.delete_all_users().await?;
    tracing::info!(products_removed, users_removed, "seed: tables cleared");

    let admin = insert_users(&repo).await?;
    insert_products(&repo, admin).await?;

    Ok(SEED_DONE)
}

async fn insert_users(repo: &RepositoryState) -> AppResult<AuthUser> {
    let mut first = None;
    for seed in USERS {
        let user = User {
            id: Uuid::new_v4(),
            email: seed.email.to_string(),
            password: hash_password(seed.password)?,
            full_name: seed.full_name.to_string(),
            is_active: true,
            roles: seed.roles.iter().map(|r| r.to_string()).collect(),
        };
        let created = repo.create_user(user).await?;
        if first.is_none() {
            first = Some(created);
        }
    }

    first
        .map(AuthUser::from)
        .ok_or_else(|| AppError::Internal("seed fixtures contain no users".to_string()))
}

async fn insert_products(repo: &RepositoryState, admin: AuthUser) -> AppResult<()> {
    let mut inserts = JoinSet::new();
    for seed in PRODUCTS {
        let repo = RepositoryState::clone(repo);
        let admin = admin.clone();
        let req = seed.to_request();
        inserts.spawn(async move { products::create(repo.as_ref(), req, &admin).await });
    }

    // Drain every task so none is aborted mid-write, then report the first failure.
    let mut first_err = None;
    while let Some(joined) = inserts.join_next().await {
        let outcome = joined
            .map_err(|e| AppError::Internal(format!("seed task failed: {e}")))
            .and_then(|inserted| inserted);
        if let Err(err) = outcome {
            tracing::error!(error = %err, "seed: product insert failed");
            if first_err.is_none() {
                first_err = Some(err);
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => {
            tracing::info!(count = PRODUCTS.len(), "seed: products inserted");
            Ok(())
        }
    }
}
