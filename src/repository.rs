use crate::{
    error::StoreError,
    models::{Product, ProductImage, ProductWithImages, User},
    unit_of_work::UnitOfWork,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract for the Credential Store and the Catalog Store.
/// Handlers and services only ever see `Arc<dyn Repository>`, so the backing
/// store (Postgres, or the in-memory store used by tests) can be swapped
/// without touching request logic.
///
/// Writes report unique-constraint violations as `StoreError::UniqueViolation`
/// with the database's detail message; every other failure is
/// `StoreError::Backend`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---

    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Lookup used by login. The returned row includes the password hash.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn delete_all_users(&self) -> Result<u64, StoreError>;

    // --- Catalog Store ---

    /// Inserts the product row and one image row per URL as a single atomic write.
    async fn insert_product(
        &self,
        product: &Product,
        image_urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError>;
    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductWithImages>, StoreError>;
    /// Matches `UPPER(title) = UPPER(title)` or `slug = slug`.
    async fn find_product_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<ProductWithImages>, StoreError>;
    /// One page of products in storage-default order.
    async fn list_products(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductWithImages>, StoreError>;
    /// Deletes a product; its images go with it. Returns false if nothing matched.
    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError>;
    async fn delete_all_products(&self) -> Result<u64, StoreError>;

    // --- Transactions ---

    /// Opens a transaction. See `unit_of_work::ScopedTransaction` for the
    /// lifecycle wrapper callers should use.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the image rows for `products` in one query and zips them back
    /// onto their owners, preserving the product order.
    async fn attach_images(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithImages>, StoreError> {
        if products.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let rows = sqlx::query_as::<_, ProductImage>(
            r#"SELECT id, url, product_id
                 FROM product_images
                WHERE product_id = ANY($1)
                ORDER BY id"#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_product: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for image in rows {
            by_product.entry(image.product_id).or_default().push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let images = by_product.remove(&product.id).unwrap_or_default();
                ProductWithImages { product, images }
            })
            .collect())
    }

    async fn attach_images_one(
        &self,
        product: Option<Product>,
    ) -> Result<Option<ProductWithImages>, StoreError> {
        match product {
            Some(product) => Ok(self.attach_images(vec![product]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, email, password, full_name, is_active, roles)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING id, email, password, full_name, is_active, roles"#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(&user.roles)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, full_name, is_active, roles FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, full_name, is_active, roles FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn insert_product(
        &self,
        product: &Product,
        image_urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO products
                   (id, title, price, description, slug, stock, sizes, gender, tags, user_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.slug)
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.gender)
        .bind(&product.tags)
        .bind(product.user_id)
        .execute(&mut *tx)
        .await?;

        let images = insert_image_rows(&mut tx, product.id, image_urls).await?;
        tx.commit().await?;
        Ok(images)
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductWithImages>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, description, slug, stock, sizes, gender, tags, user_id
                 FROM products
                WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.attach_images_one(product).await
    }

    async fn find_product_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<ProductWithImages>, StoreError> {
        let product = sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, description, slug, stock, sizes, gender, tags, user_id
                 FROM products
                WHERE UPPER(title) = UPPER($1) OR slug = $2
                LIMIT 1"#,
        )
        .bind(title)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        self.attach_images_one(product).await
    }

    async fn list_products(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductWithImages>, StoreError> {
        let products = sqlx::query_as::<_, Product>(
            r#"SELECT id, title, price, description, slug, stock, sizes, gender, tags, user_id
                 FROM products
                LIMIT $1 OFFSET $2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        self.attach_images(products).await
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_products(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM products").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

async fn insert_image_rows(
    tx: &mut Transaction<'static, Postgres>,
    product_id: Uuid,
    urls: &[String],
) -> Result<Vec<ProductImage>, StoreError> {
    let mut images = Vec::with_capacity(urls.len());
    for url in urls {
        let image = sqlx::query_as::<_, ProductImage>(
            r#"INSERT INTO product_images (url, product_id)
               VALUES ($1, $2)
               RETURNING id, url, product_id"#,
        )
        .bind(url)
        .bind(product_id)
        .fetch_one(&mut **tx)
        .await?;
        images.push(image);
    }
    Ok(images)
}

/// PgUnitOfWork
///
/// A `UnitOfWork` over one pooled connection. Dropping the inner sqlx
/// transaction without committing issues a rollback and returns the
/// connection to the pool.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn delete_images(&mut self, product_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_images(
        &mut self,
        product_id: Uuid,
        urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError> {
        insert_image_rows(&mut self.tx, product_id, urls).await
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE products
                  SET title = $2,
                      price = $3,
                      description = $4,
                      slug = $5,
                      stock = $6,
                      sizes = $7,
                      gender = $8,
                      tags = $9,
                      user_id = $10
                WHERE id = $1"#,
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.slug)
        .bind(product.stock)
        .bind(&product.sizes)
        .bind(&product.gender)
        .bind(&product.tags)
        .bind(product.user_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
