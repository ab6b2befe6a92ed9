use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::StoreError,
    models::{Product, ProductImage},
    repository::Repository,
};

/// UnitOfWork
///
/// The storage operations available inside one open transaction. Nothing
/// done through it is visible to other callers until `commit`.
///
/// Implementations must roll back when dropped without `commit`, so that a
/// transaction abandoned on an early return or a panic releases its resources
/// and leaves the store untouched.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Deletes every image row owned by `product_id`. Returns the row count.
    async fn delete_images(&mut self, product_id: Uuid) -> Result<u64, StoreError>;

    async fn insert_images(
        &mut self,
        product_id: Uuid,
        urls: &[String],
    ) -> Result<Vec<ProductImage>, StoreError>;

    /// Writes every scalar column of `product` over the stored row.
    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// ScopedTransaction
///
/// Open / commit-or-rollback / close lifecycle around a `UnitOfWork`.
/// `close` consumes the scope, so the handle is released on every path:
/// committed on success, rolled back on failure, and rolled back by the
/// implementation's drop if the scope is abandoned before `close`.
pub struct ScopedTransaction {
    work: Box<dyn UnitOfWork>,
}

impl ScopedTransaction {
    pub async fn open(repo: &dyn Repository) -> Result<Self, StoreError> {
        let work = repo.begin().await?;
        tracing::debug!("transaction opened");
        Ok(Self { work })
    }

    pub fn work(&mut self) -> &mut dyn UnitOfWork {
        &mut *self.work
    }

    /// Commits when `outcome` is `Ok`, rolls back otherwise.
    ///
    /// A failed rollback is logged and the original error is returned, since
    /// that is the one the caller can act on.
    pub async fn close<T>(self, outcome: Result<T, StoreError>) -> Result<T, StoreError> {
        match outcome {
            Ok(value) => {
                self.work.commit().await?;
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(error = %err, "rolling back transaction");
                if let Err(rollback_err) = self.work.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// replace_product_images
///
/// The transactional product update:
/// `begin -> delete old images -> insert new images -> save product -> commit`.
///
/// When `images` is `None` the image set is left alone and only the product
/// row is saved. Any failure rolls the whole sequence back, so the stored
/// image set is either the old one or the new one, never a mix.
pub async fn replace_product_images(
    repo: &dyn Repository,
    product: &Product,
    images: Option<&[String]>,
) -> Result<(), StoreError> {
    let mut tx = ScopedTransaction::open(repo).await?;
    let outcome = apply_product_update(tx.work(), product, images).await;
    tx.close(outcome).await
}

async fn apply_product_update(
    work: &mut dyn UnitOfWork,
    product: &Product,
    images: Option<&[String]>,
) -> Result<(), StoreError> {
    if let Some(urls) = images {
        let removed = work.delete_images(product.id).await?;
        let inserted = work.insert_images(product.id, urls).await?;
        tracing::debug!(
            product_id = %product.id,
            removed,
            inserted = inserted.len(),
            "image set replaced"
        );
    }
    work.save_product(product).await
}
