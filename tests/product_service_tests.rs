use storefront_api::{
    AppError,
    auth::AuthUser,
    memory::{FailPoint, MemoryRepository},
    models::{CreateProductRequest, Pagination, ROLE_ADMIN, UpdateProductRequest},
    repository::Repository,
    services::products,
};
use uuid::Uuid;

// --- Helpers ---

fn admin() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: "admin@example.com".to_string(),
        full_name: "Admin".to_string(),
        roles: vec![ROLE_ADMIN.to_string()],
    }
}

fn product_request(title: &str, images: &[&str]) -> CreateProductRequest {
    CreateProductRequest {
        title: title.to_string(),
        price: Some(10.0),
        sizes: vec!["M".to_string()],
        gender: "unisex".to_string(),
        images: Some(images.iter().map(|s| s.to_string()).collect()),
        ..Default::default()
    }
}

fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// --- create / find ---

#[tokio::test]
async fn test_create_then_find_one_plain_returns_same_product() {
    let repo = MemoryRepository::new();
    let creator = admin();

    let created = products::create(&repo, product_request("Mug", &["u1.jpg", "u2.jpg"]), &creator)
        .await
        .unwrap();
    assert_eq!(created.product.slug, "mug");
    assert_eq!(created.product.user_id, Some(creator.id));

    let found = products::find_one_plain(&repo, "Mug").await.unwrap();
    assert_eq!(found.product.title, "Mug");
    assert_eq!(found.product.price, 10.0);
    assert_eq!(found.images, urls(&["u1.jpg", "u2.jpg"]));
    assert_eq!(found, created);
}

#[tokio::test]
async fn test_find_one_matches_title_case_insensitively() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Shirt", &[]), &admin())
        .await
        .unwrap();

    for term in ["Shirt", "shirt", "SHIRT"] {
        let found = products::find_one(&repo, term).await.unwrap();
        assert_eq!(found.product.id, created.product.id, "term {term}");
    }
}

#[tokio::test]
async fn test_find_one_by_id_and_slug() {
    let repo = MemoryRepository::new();
    let mut req = product_request("Men's Chill Crew Neck", &[]);
    req.slug = Some("Chill Crew".to_string());
    let created = products::create(&repo, req, &admin()).await.unwrap();
    assert_eq!(created.product.slug, "chill_crew");

    let by_id = products::find_one(&repo, &created.product.id.to_string()).await.unwrap();
    assert_eq!(by_id.product.id, created.product.id);

    let by_slug = products::find_one(&repo, "CHILL_CREW").await.unwrap();
    assert_eq!(by_slug.product.id, created.product.id);
}

#[tokio::test]
async fn test_find_one_miss_is_not_found() {
    let repo = MemoryRepository::new();
    let err = products::find_one(&repo, "nothing-here").await.unwrap_err();
    match err {
        AppError::NotFound(msg) => assert_eq!(msg, "Product with term nothing-here not found"),
        other => panic!("expected not found, got {other:?}"),
    }

    let err = products::find_one(&repo, &Uuid::new_v4().to_string()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_title_is_conflict() {
    let repo = MemoryRepository::new();
    products::create(&repo, product_request("Cap", &[]), &admin()).await.unwrap();

    let err = products::create(&repo, product_request("Cap", &[]), &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// --- update ---

#[tokio::test]
async fn test_update_replaces_image_set() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Hoodie", &["a", "b"]), &admin())
        .await
        .unwrap();

    let update = UpdateProductRequest {
        images: Some(urls(&["c"])),
        stock: Some(3),
        ..Default::default()
    };
    let updated = products::update(&repo, created.product.id, update).await.unwrap();

    assert_eq!(updated.images, urls(&["c"]));
    assert_eq!(updated.product.stock, 3);
    assert_eq!(repo.image_count().await, 1);
}

#[tokio::test]
async fn test_update_without_images_keeps_them() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Beanie", &["a", "b"]), &admin())
        .await
        .unwrap();

    let update = UpdateProductRequest {
        title: Some("Winter Beanie".to_string()),
        slug: Some("Winter Beanie".to_string()),
        ..Default::default()
    };
    let updated = products::update(&repo, created.product.id, update).await.unwrap();

    assert_eq!(updated.product.title, "Winter Beanie");
    assert_eq!(updated.product.slug, "winter_beanie");
    assert_eq!(updated.images, urls(&["a", "b"]));
}

#[tokio::test]
async fn test_update_with_null_description_clears_it() {
    let repo = MemoryRepository::new();
    let request = CreateProductRequest {
        description: Some("Warm".to_string()),
        ..product_request("Scarf", &[])
    };
    let created = products::create(&repo, request, &admin()).await.unwrap();

    // Fields left out of the patch keep their value.
    let untouched = products::update(&repo, created.product.id, UpdateProductRequest::default())
        .await
        .unwrap();
    assert_eq!(untouched.product.description.as_deref(), Some("Warm"));

    let update = UpdateProductRequest {
        description: Some(None),
        ..Default::default()
    };
    let cleared = products::update(&repo, created.product.id, update).await.unwrap();
    assert_eq!(cleared.product.description, None);
}

#[tokio::test]
async fn test_failed_save_rolls_back_image_replacement() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Jacket", &["a", "b"]), &admin())
        .await
        .unwrap();

    let failing = repo.with_fail_point(Some(FailPoint::SaveProduct));
    let update = UpdateProductRequest {
        images: Some(urls(&["c"])),
        price: Some(99.0),
        ..Default::default()
    };
    let err = products::update(&failing, created.product.id, update).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));

    let after = products::find_one_plain(&repo, "Jacket").await.unwrap();
    assert_eq!(after.images, urls(&["a", "b"]));
    assert_eq!(after.product.price, 10.0);
}

#[tokio::test]
async fn test_failed_insert_rolls_back_image_delete() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Tee", &["a", "b"]), &admin())
        .await
        .unwrap();

    let failing = repo.with_fail_point(Some(FailPoint::InsertImages));
    let update = UpdateProductRequest {
        images: Some(urls(&["c", "d"])),
        ..Default::default()
    };
    assert!(products::update(&failing, created.product.id, update).await.is_err());

    let after = products::find_one_plain(&repo, "Tee").await.unwrap();
    assert_eq!(after.images, urls(&["a", "b"]));
    assert_eq!(repo.image_count().await, 2);
}

#[tokio::test]
async fn test_update_unknown_product_is_not_found() {
    let repo = MemoryRepository::new();
    let id = Uuid::new_v4();
    let err = products::update(&repo, id, UpdateProductRequest::default())
        .await
        .unwrap_err();
    match err {
        AppError::NotFound(msg) => assert_eq!(msg, format!("This product with id {id} not exist")),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_update_to_taken_title_is_conflict_and_rolled_back() {
    let repo = MemoryRepository::new();
    products::create(&repo, product_request("Socks", &[]), &admin()).await.unwrap();
    let other = products::create(&repo, product_request("Gloves", &["g"]), &admin())
        .await
        .unwrap();

    let update = UpdateProductRequest {
        title: Some("Socks".to_string()),
        images: Some(urls(&["x"])),
        ..Default::default()
    };
    let err = products::update(&repo, other.product.id, update).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let after = products::find_one_plain(&repo, "Gloves").await.unwrap();
    assert_eq!(after.images, urls(&["g"]));
}

// --- listing / removal ---

#[tokio::test]
async fn test_find_all_paginates() {
    let repo = MemoryRepository::new();
    for i in 0..12 {
        products::create(&repo, product_request(&format!("Item {i}"), &["x.jpg"]), &admin())
            .await
            .unwrap();
    }

    let first = products::find_all(&repo, Pagination::default()).await.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(first[0].images, urls(&["x.jpg"]));

    let rest = products::find_all(&repo, Pagination { limit: Some(5), offset: Some(10) })
        .await
        .unwrap();
    assert_eq!(rest.len(), 2);

    let bad = products::find_all(&repo, Pagination { limit: Some(0), offset: None }).await;
    assert!(matches!(bad, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_remove_deletes_product_and_images() {
    let repo = MemoryRepository::new();
    let created = products::create(&repo, product_request("Scarf", &["a", "b"]), &admin())
        .await
        .unwrap();

    products::remove(&repo, created.product.id).await.unwrap();
    assert_eq!(repo.image_count().await, 0);
    assert!(repo.find_product_by_id(created.product.id).await.unwrap().is_none());

    let again = products::remove(&repo, created.product.id).await.unwrap_err();
    assert!(matches!(again, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_all_then_find_all_is_empty() {
    let repo = MemoryRepository::new();
    for title in ["One", "Two", "Three"] {
        products::create(&repo, product_request(title, &["a"]), &admin())
            .await
            .unwrap();
    }

    assert_eq!(products::delete_all(&repo).await.unwrap(), 3);
    let page = products::find_all(&repo, Pagination::default()).await.unwrap();
    assert!(page.is_empty());
    assert_eq!(repo.image_count().await, 0);
}
