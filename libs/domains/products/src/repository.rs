use async_trait::async_trait;
use chrono::Utc;
use domain_users::{InMemoryUserRepository, UserRepository};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductListing, UpdateProduct};

/// Repository trait for Product persistence
///
/// Listing queries join each product with its owner's contact details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every listing, in id order
    async fn list_all(&self) -> ProductResult<Vec<ProductListing>>;

    /// Listings whose model name matches exactly
    async fn list_by_name(&self, model_name: &str) -> ProductResult<Vec<ProductListing>>;

    async fn list_by_owner(&self, user_id: i32) -> ProductResult<Vec<ProductListing>>;

    async fn find_listing(&self, product_id: i32) -> ProductResult<Option<ProductListing>>;

    /// The bare product, without the owner join
    async fn get_by_id(&self, product_id: i32) -> ProductResult<Option<Product>>;

    async fn create(&self, input: NewProduct) -> ProductResult<Product>;

    /// Overwrite the four mutable fields. Fails with NotFound if absent.
    async fn update(&self, product_id: i32, input: UpdateProduct) -> ProductResult<Product>;

    /// Fails with NotFound if absent.
    async fn delete(&self, product_id: i32) -> ProductResult<()>;
}

/// In-memory implementation of ProductRepository (for development/testing).
///
/// Owners are joined from the given user directory. Clones share storage.
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<i32, Product>>>,
    last_id: Arc<AtomicI32>,
    users: InMemoryUserRepository,
}

impl InMemoryProductRepository {
    pub fn new(users: InMemoryUserRepository) -> Self {
        Self {
            products: Arc::new(RwLock::new(BTreeMap::new())),
            last_id: Arc::new(AtomicI32::new(0)),
            users,
        }
    }

    async fn join(&self, products: Vec<Product>) -> ProductResult<Vec<ProductListing>> {
        let mut listings = Vec::with_capacity(products.len());
        for product in products {
            let owner = self.users.get_by_id(product.user_id).await?;
            listings.push(ProductListing::new(product, owner.as_ref()));
        }
        Ok(listings)
    }

    async fn select(&self, predicate: impl Fn(&Product) -> bool) -> ProductResult<Vec<ProductListing>> {
        let matching: Vec<Product> = {
            let products = self.products.read().await;
            products.values().filter(|p| predicate(p)).cloned().collect()
        };
        self.join(matching).await
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> ProductResult<Vec<ProductListing>> {
        self.select(|_| true).await
    }

    async fn list_by_name(&self, model_name: &str) -> ProductResult<Vec<ProductListing>> {
        self.select(|p| p.model_name == model_name).await
    }

    async fn list_by_owner(&self, user_id: i32) -> ProductResult<Vec<ProductListing>> {
        self.select(|p| p.user_id == user_id).await
    }

    async fn find_listing(&self, product_id: i32) -> ProductResult<Option<ProductListing>> {
        Ok(self.select(|p| p.product_id == product_id).await?.pop())
    }

    async fn get_by_id(&self, product_id: i32) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn create(&self, input: NewProduct) -> ProductResult<Product> {
        let product_id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let product = Product {
            product_id,
            user_id: input.user_id,
            model_name: input.model_name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            is_featured_ad: input.is_featured_ad,
            image_uri: input.image_uri,
            created_at: now,
            updated_at: now,
        };

        self.products
            .write()
            .await
            .insert(product_id, product.clone());

        tracing::info!(product_id, user_id = product.user_id, "Created product");
        Ok(product)
    }

    async fn update(&self, product_id: i32, input: UpdateProduct) -> ProductResult<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&product_id)
            .ok_or(ProductError::NotFound(product_id))?;

        product.apply_update(input);

        tracing::info!(product_id, "Updated product");
        Ok(product.clone())
    }

    async fn delete(&self, product_id: i32) -> ProductResult<()> {
        self.products
            .write()
            .await
            .remove(&product_id)
            .ok_or(ProductError::NotFound(product_id))?;

        tracing::info!(product_id, "Deleted product");
        Ok(())
    }
}
