//! Postgres-backed checks of `PostgresRepository`. These need a database:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use serial_test::serial;
use sqlx::{PgPool, postgres::PgPoolOptions};
use storefront_api::{
    error::StoreError,
    models::{Product, User},
    repository::{PostgresRepository, Repository},
    unit_of_work::replace_product_images,
};
use uuid::Uuid;

async fn setup() -> (PgPool, PostgresRepository) {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres in tests");
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    let repo = PostgresRepository::new(pool.clone());
    repo.delete_all_products().await.unwrap();
    repo.delete_all_users().await.unwrap();
    (pool, repo)
}

fn product(title: &str) -> Product {
    Product {
        id: Uuid::new_v4(),
        title: title.to_string(),
        price: 12.5,
        slug: storefront_api::models::normalize_slug(title),
        sizes: vec!["M".to_string()],
        gender: "unisex".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_duplicate_email_reports_postgres_detail() {
    let (_pool, repo) = setup().await;
    let user = User {
        id: Uuid::new_v4(),
        email: "pg@example.com".to_string(),
        password: "hash".to_string(),
        full_name: "Pg".to_string(),
        is_active: true,
        roles: vec!["user".to_string()],
    };
    repo.create_user(user.clone()).await.unwrap();

    let err = repo
        .create_user(User {
            id: Uuid::new_v4(),
            ..user
        })
        .await
        .unwrap_err();
    match err {
        StoreError::UniqueViolation(detail) => {
            assert_eq!(detail, "Key (email)=(pg@example.com) already exists.")
        }
        other => panic!("expected unique violation, got {other:?}"),
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_lookup_by_title_is_case_insensitive() {
    let (_pool, repo) = setup().await;
    let p = product("Shirt");
    repo.insert_product(&p, &["a.jpg".to_string()]).await.unwrap();

    for term in ["Shirt", "shirt", "SHIRT"] {
        let found = repo
            .find_product_by_title_or_slug(term, &term.to_lowercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.product.id, p.id);
        assert_eq!(found.images.len(), 1);
    }
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_image_replacement_commits_atomically() {
    let (pool, repo) = setup().await;
    let p = product("Hoodie");
    repo.insert_product(&p, &["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    let replacement = vec!["c".to_string()];
    replace_product_images(&repo, &p, Some(replacement.as_slice())).await.unwrap();

    let urls: Vec<String> =
        sqlx::query_scalar("SELECT url FROM product_images WHERE product_id = $1 ORDER BY id")
            .bind(p.id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(urls, vec!["c"]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_failed_save_rolls_back_image_delete() {
    let (_pool, repo) = setup().await;
    let taken = product("Socks");
    repo.insert_product(&taken, &[]).await.unwrap();
    let p = product("Gloves");
    repo.insert_product(&p, &["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    // Saving with a taken title violates the unique constraint inside the transaction.
    let clashing = Product {
        title: "Socks".to_string(),
        ..p.clone()
    };
    let err = replace_product_images(&repo, &clashing, Some(&["c".to_string()][..]))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));

    let after = repo.find_product_by_id(p.id).await.unwrap().unwrap();
    assert_eq!(after.product.title, "Gloves");
    let urls: Vec<&str> = after.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["a", "b"]);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_delete_product_cascades_to_images() {
    let (pool, repo) = setup().await;
    let p = product("Scarf");
    repo.insert_product(&p, &["a".to_string()]).await.unwrap();

    assert!(repo.delete_product(p.id).await.unwrap());
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_images")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
