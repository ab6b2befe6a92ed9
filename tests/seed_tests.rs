use std::sync::Arc;

use storefront_api::{
    memory::MemoryRepository,
    models::{Pagination, ROLE_ADMIN, User},
    repository::{Repository, RepositoryState},
    seed_data::{PRODUCTS, USERS},
    services::{auth, products, seed},
};
use uuid::Uuid;

#[tokio::test]
async fn test_seed_replaces_existing_data() {
    let repo = MemoryRepository::new();
    repo.create_user(User {
        id: Uuid::new_v4(),
        email: "stale@example.com".to_string(),
        ..Default::default()
    })
    .await
    .unwrap();

    let state: RepositoryState = Arc::new(repo.clone());
    assert_eq!(seed::run_seed(state).await.unwrap(), "Seed executed");

    assert!(repo.find_user_by_email("stale@example.com").await.unwrap().is_none());

    let admin = repo
        .find_user_by_email(USERS[0].email)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.roles, vec![ROLE_ADMIN]);

    let page = Pagination { limit: Some(100), offset: None };
    let all = products::find_all(&repo, page).await.unwrap();
    assert_eq!(all.len(), PRODUCTS.len());
    assert!(all.iter().all(|p| p.product.user_id == Some(admin.id)));
}

#[tokio::test]
async fn test_seed_is_repeatable() {
    let repo = MemoryRepository::new();
    let state: RepositoryState = Arc::new(repo.clone());

    seed::run_seed(state.clone()).await.unwrap();
    seed::run_seed(state).await.unwrap();

    let expected_images: usize = PRODUCTS.iter().map(|p| p.images.len()).sum();
    assert_eq!(repo.image_count().await, expected_images);
}

#[tokio::test]
async fn test_seeded_users_can_log_in() {
    let repo = MemoryRepository::new();
    seed::run_seed(Arc::new(repo.clone())).await.unwrap();

    let seeded = &USERS[1];
    let response = auth::login(
        &repo,
        "seed-secret",
        storefront_api::models::LoginUserRequest {
            email: seeded.email.to_string(),
            password: seeded.password.to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(response.user.email, seeded.email);
}
