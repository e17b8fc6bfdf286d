use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use billdesk_core::ProductId;
use billdesk_products::Product;

use super::{RepositoryError, RepositoryResult};

/// Read access to the product catalog.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get(&self, id: ProductId) -> RepositoryResult<Product>;

    /// Case-insensitive substring match on the product name, sorted by name.
    async fn search_by_name(&self, fragment: &str) -> RepositoryResult<Vec<Product>>;
}

#[async_trait::async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn get(&self, id: ProductId) -> RepositoryResult<Product> {
        (**self).get(id).await
    }

    async fn search_by_name(&self, fragment: &str) -> RepositoryResult<Vec<Product>> {
        (**self).search_by_name(fragment).await
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            inner: RwLock::new(products.into_iter().map(|p| (p.id_typed(), p)).collect()),
        }
    }

    pub fn upsert(&self, product: Product) -> RepositoryResult<()> {
        let mut map = self.inner.write()?;
        map.insert(product.id_typed(), product);
        Ok(())
    }

    /// Synchronous lookup for re-pricing reopened drafts.
    pub fn lookup(&self, id: ProductId) -> Option<Product> {
        self.inner.read().ok()?.get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get(&self, id: ProductId) -> RepositoryResult<Product> {
        let map = self.inner.read()?;
        map.get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found(format!("product {id}")))
    }

    async fn search_by_name(&self, fragment: &str) -> RepositoryResult<Vec<Product>> {
        let needle = fragment.trim().to_lowercase();
        let map = self.inner.read()?;
        let mut found: Vec<Product> = map
            .values()
            .filter(|p| p.name().to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(found)
    }
}
