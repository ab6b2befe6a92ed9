use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{
        CreateProductRequest, Pagination, PlainProduct, Product, ProductWithImages,
        UpdateProductRequest, normalize_slug,
    },
    repository::Repository,
    unit_of_work::replace_product_images,
};

use super::ensure_valid;

/// create
///
/// Inserts the product and its image rows in one write. The response echoes
/// the submitted URLs rather than re-reading them.
pub async fn create(
    repo: &dyn Repository,
    req: CreateProductRequest,
    creator: &AuthUser,
) -> AppResult<PlainProduct> {
    ensure_valid(req.validate())?;

    let CreateProductRequest {
        title,
        price,
        description,
        slug,
        stock,
        sizes,
        gender,
        tags,
        images,
    } = req;

    let slug = normalize_slug(slug.as_deref().unwrap_or(&title));
    let product = Product {
        id: Uuid::new_v4(),
        title,
        price: price.unwrap_or(0.0),
        description,
        slug,
        stock: stock.unwrap_or(0),
        sizes,
        gender,
        tags: tags.unwrap_or_default(),
        user_id: Some(creator.id),
    };
    let images = images.unwrap_or_default();

    repo.insert_product(&product, &images).await?;
    tracing::info!(product_id = %product.id, images = images.len(), "product created");

    Ok(PlainProduct { product, images })
}

/// find_one
///
/// Resolves `term` as an id when it parses as a UUID, otherwise as a
/// case-insensitive title or a slug.
pub async fn find_one(repo: &dyn Repository, term: &str) -> AppResult<ProductWithImages> {
    let found = match Uuid::parse_str(term) {
        Ok(id) => repo.find_product_by_id(id).await?,
        Err(_) => {
            repo.find_product_by_title_or_slug(term, &term.to_lowercase())
                .await?
        }
    };

    found.ok_or_else(|| AppError::NotFound(format!("Product with term {term} not found")))
}

pub async fn find_one_plain(repo: &dyn Repository, term: &str) -> AppResult<PlainProduct> {
    Ok(find_one(repo, term).await?.into())
}

pub async fn find_all(repo: &dyn Repository, page: Pagination) -> AppResult<Vec<PlainProduct>> {
    ensure_valid(page.validate())?;
    let products = repo.list_products(page.limit(), page.offset()).await?;
    Ok(products.into_iter().map(PlainProduct::from).collect())
}

/// update
///
/// Merges `req` over the stored product and writes it back through a single
/// transaction. A supplied `images` list replaces the stored set wholesale.
pub async fn update(
    repo: &dyn Repository,
    id: Uuid,
    req: UpdateProductRequest,
) -> AppResult<PlainProduct> {
    ensure_valid(req.validate())?;

    let mut product = repo
        .find_product_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("This product with id {id} not exist")))?
        .product;

    let UpdateProductRequest {
        title,
        price,
        description,
        slug,
        stock,
        sizes,
        gender,
        tags,
        images,
    } = req;

    if let Some(title) = title {
        product.title = title;
    }
    if let Some(price) = price {
        product.price = price;
    }
    if let Some(description) = description {
        product.description = description;
    }
    if let Some(slug) = slug {
        product.slug = normalize_slug(&slug);
    }
    if let Some(stock) = stock {
        product.stock = stock;
    }
    if let Some(sizes) = sizes {
        product.sizes = sizes;
    }
    if let Some(gender) = gender {
        product.gender = gender;
    }
    if let Some(tags) = tags {
        product.tags = tags;
    }

    replace_product_images(repo, &product, images.as_deref()).await?;
    tracing::info!(product_id = %id, "product updated");

    find_one_plain(repo, &id.to_string()).await
}

pub async fn remove(repo: &dyn Repository, id: Uuid) -> AppResult<()> {
    let product = find_one(repo, &id.to_string()).await?;
    if repo.delete_product(product.product.id).await? {
        tracing::info!(product_id = %id, "product deleted");
    }
    Ok(())
}

/// Removes every product and, through the cascade, every image.
pub async fn delete_all(repo: &dyn Repository) -> AppResult<u64> {
    let removed = repo.delete_all_products().await?;
    tracing::info!(removed, "catalog cleared");
    Ok(removed)
}
