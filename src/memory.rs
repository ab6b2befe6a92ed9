use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Product, ProductImage, ProductWithImages, User},
    repository::Repository,
    unit_of_work::UnitOfWork,
};

/// FailPoint
///
/// Unit-of-work steps at which `MemoryRepository` can be told to fail, to
/// exercise rollback paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    DeleteImages,
    InsertImages,
    SaveProduct,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    images: Vec<ProductImage>,
    next_image_id: i64,
}

impl Tables {
    fn aggregate(&self, product: &Product) -> ProductWithImages {
        ProductWithImages {
            product: product.clone(),
            images: self
                .images
                .iter()
                .filter(|image| image.product_id == product.id)
                .cloned()
                .collect(),
        }
    }

    fn push_images(&mut self, product_id: Uuid, urls: &[String]) -> Vec<ProductImage> {
        let mut created = Vec::with_capacity(urls.len());
        for url in urls {
            self.next_image_id += 1;
            let image = ProductImage {
                id: self.next_image_id,
                url: url.clone(),
                product_id,
            };
            self.images.push(image.clone());
            created.push(image);
        }
        created
    }

    /// Mirrors the `products_title_key` / `products_slug_key` constraints.
    fn check_product_unique(&self, product: &Product) -> Result<(), StoreError> {
        for other in self.products.iter().filter(|p| p.id != product.id) {
            if other.title == product.title {
                return Err(StoreError::UniqueViolation(format!(
                    "Key (title)=({}) already exists.",
                    product.title
                )));
            }
            if other.slug == product.slug {
                return Err(StoreError::UniqueViolation(format!(
                    "Key (slug)=({}) already exists.",
                    product.slug
                )));
            }
        }
        Ok(())
    }
}

/// MemoryRepository
///
/// An in-process `Repository` with the same observable semantics as the
/// Postgres one: unique constraints, cascading image deletes and
/// all-or-nothing transactions. Used by the test suite and by local runs with
/// `STORE=memory`.
///
/// A transaction holds the table lock for its whole lifetime and works on a
/// staged copy, which is swapped in on commit and discarded on rollback or drop.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
    fail_at: Option<FailPoint>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose transactions fail at `point`.
    pub fn failing_at(point: FailPoint) -> Self {
        Self {
            tables: Arc::default(),
            fail_at: Some(point),
        }
    }

    /// A handle on the same tables whose transactions fail at `point`.
    pub fn with_fail_point(&self, point: Option<FailPoint>) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            fail_at: point,
        }
    }

    /// Flips a user's active flag. Returns false if no such user.
    pub async fn set_user_active(&self, id: Uuid, active: bool) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }

    /// Number of image rows currently stored, across all products.
    pub async fn image_count(&self) -> usize {
        self.tables.lock().await.images.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation(format!(
                "Key (email)=({}) already exists.",
                user.email
            )));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn delete_all_users(&self) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let removed = tables.users.len() as u64;
        tables.users.clear();
        for product in tables.products.iter_mut() {
            product.user_id = None;
        }
        Ok(removed)
    }

    async fn insert_product(
        &self,
        product: &Product,
        image_urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::UniqueViolation(format!(
                "Key (id)=({}) already exists.",
                product.id
            )));
        }
        tables.check_product_unique(product)?;
        tables.products.push(product.clone());
        Ok(tables.push_images(product.id, image_urls))
    }

    async fn find_product_by_id(&self, id: Uuid) -> Result<Option<ProductWithImages>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.aggregate(p)))
    }

    async fn find_product_by_title_or_slug(
        &self,
        title: &str,
        slug: &str,
    ) -> Result<Option<ProductWithImages>, StoreError> {
        let tables = self.tables.lock().await;
        let wanted = title.to_uppercase();
        Ok(tables
            .products
            .iter()
            .find(|p| p.title.to_uppercase() == wanted || p.slug == slug)
            .map(|p| tables.aggregate(p)))
    }

    async fn list_products(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProductWithImages>, StoreError> {
        let tables = self.tables.lock().await;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(tables
            .products
            .iter()
            .skip(skip)
            .take(take)
            .map(|p| tables.aggregate(p))
            .collect())
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        tables.images.retain(|image| image.product_id != id);
        Ok(tables.products.len() < before)
    }

    async fn delete_all_products(&self) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let removed = tables.products.len() as u64;
        tables.products.clear();
        tables.images.clear();
        Ok(removed)
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            staged,
            fail_at: self.fail_at,
        }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    fail_at: Option<FailPoint>,
}

impl MemoryUnitOfWork {
    fn trip(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.fail_at == Some(point) {
            return Err(StoreError::Backend(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn delete_images(&mut self, product_id: Uuid) -> Result<u64, StoreError> {
        let before = self.staged.images.len();
        self.staged.images.retain(|image| image.product_id != product_id);
        self.trip(FailPoint::DeleteImages)?;
        Ok((before - self.staged.images.len()) as u64)
    }

    async fn insert_images(
        &mut self,
        product_id: Uuid,
        urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError> {
        let created = self.staged.push_images(product_id, urls);
        self.trip(FailPoint::InsertImages)?;
        Ok(created)
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        self.trip(FailPoint::SaveProduct)?;
        self.staged.check_product_unique(product)?;
        if let Some(row) = self.staged.products.iter_mut().find(|p| p.id == product.id) {
            *row = product.clone();
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(title: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: crate::models::normalize_slug(title),
            gender: "unisex".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let repo = MemoryRepository::new();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            ..Default::default()
        };
        repo.create_user(user.clone()).await.unwrap();

        let again = User { id: Uuid::new_v4(), ..user };
        let err = repo.create_user(again).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref d) if d.contains("a@b.co")));
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_tables_untouched() {
        let repo = MemoryRepository::new();
        let p = product("Mug");
        repo.insert_product(&p, &["a.jpg".into()]).await.unwrap();

        {
            let mut work = repo.begin().await.unwrap();
            work.delete_images(p.id).await.unwrap();
            // dropped without commit
        }

        let stored = repo.find_product_by_id(p.id).await.unwrap().unwrap();
        assert_eq!(stored.images.len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_product_cascades_to_images() {
        let repo = MemoryRepository::new();
        let p = product("Mug");
        repo.insert_product(&p, &["a.jpg".into(), "b.jpg".into()])
            .await
            .unwrap();
        assert_eq!(repo.image_count().await, 2);

        assert!(repo.delete_product(p.id).await.unwrap());
        assert_eq!(repo.image_count().await, 0);
        assert!(!repo.delete_product(p.id).await.unwrap());
    }
}
