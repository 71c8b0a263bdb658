use std::sync::Arc;

use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::merge::{apply_full_update, apply_partial_update};
use super::repo::ProductStore;
use super::repo_types::{ActivityScope, NewProduct, PageRequest, Product, ProductChanges, ProductFilter};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 25;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),
    #[error("Product not found.")]
    NotFound,
    #[error("Product is inactive.")]
    Inactive,
    #[error("Product is already active.")]
    AlreadyActive,
    #[error("Only inactive products can be deleted permanently.")]
    StillActive,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type ProductResult<T> = Result<T, ProductError>;

pub fn check_name(name: &str) -> ProductResult<()> {
    if name.trim().is_empty() {
        return Err(ProductError::Validation("Name is required.".into()));
    }
    Ok(())
}

pub fn check_price(price: Decimal) -> ProductResult<()> {
    if price <= Decimal::ZERO {
        return Err(ProductError::Validation("Price must be greater than 0.".into()));
    }
    Ok(())
}

pub fn check_stock(stock_quantity: i32) -> ProductResult<()> {
    if stock_quantity < 0 {
        return Err(ProductError::Validation("StockQuantity cannot be negative.".into()));
    }
    Ok(())
}

pub fn check_new(fields: &NewProduct) -> ProductResult<()> {
    check_name(&fields.name)?;
    check_price(fields.price)?;
    check_stock(fields.stock_quantity)
}

/// Checks the numeric fields of an update or patch, when they were sent.
pub fn check_changes(changes: &ProductChanges) -> ProductResult<()> {
    if let Some(price) = changes.price {
        check_price(price)?;
    }
    if let Some(stock) = changes.stock_quantity {
        check_stock(stock)?;
    }
    Ok(())
}

/// Product queries and lifecycle transitions over an injected store.
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list_active(
        &self,
        category: Option<String>,
        search: Option<String>,
        page: PageRequest,
    ) -> ProductResult<Vec<Product>> {
        let filter = ProductFilter::new(true, category, search);
        Ok(self.store.list(&filter, page).await?)
    }

    pub async fn list_low_stock(
        &self,
        category: Option<String>,
        search: Option<String>,
        threshold: i32,
        page: PageRequest,
    ) -> ProductResult<Vec<Product>> {
        let filter = ProductFilter::new(true, category, search).with_stock_below(threshold);
        Ok(self.store.list(&filter, page).await?)
    }

    pub async fn list_inactive(
        &self,
        category: Option<String>,
        search: Option<String>,
        page: PageRequest,
    ) -> ProductResult<Vec<Product>> {
        let filter = ProductFilter::new(false, category, search);
        Ok(self.store.list(&filter, page).await?)
    }

    pub async fn get_active_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.store.find_by_id(id, ActivityScope::Active).await?)
    }

    pub async fn get_inactive_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.store.find_by_id(id, ActivityScope::Inactive).await?)
    }

    pub async fn create(&self, fields: NewProduct) -> ProductResult<Product> {
        check_new(&fields)?;
        let now = OffsetDateTime::now_utc();
        let product = Product {
            id: Uuid::new_v4(),
            name: fields.name.trim().to_string(),
            description: fields.description,
            price: fields.price,
            stock_quantity: fields.stock_quantity,
            category: fields.category,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let stored = self.store.insert(&product).await?;
        info!(product_id = %stored.id, "product created");
        Ok(stored)
    }

    pub async fn full_update(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product> {
        check_changes(&changes)?;
        if let Some(name) = &changes.name {
            check_name(name)?;
        }
        let mut product = self.load_active(id).await?;
        apply_full_update(&mut product, changes);
        self.save_fields(product).await
    }

    pub async fn partial_update(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product> {
        check_changes(&changes)?;
        let mut product = self.load_active(id).await?;
        apply_partial_update(&mut product, changes);
        self.save_fields(product).await
    }

    /// Deactivates without touching `updated_at`.
    pub async fn soft_delete(&self, id: Uuid) -> ProductResult<()> {
        if self.store.set_active(id, false, None).await?.is_none() {
            return Err(self.unless_missing(id, ProductError::Inactive).await);
        }
        info!(product_id = %id, "product deactivated");
        Ok(())
    }

    pub async fn reactivate(&self, id: Uuid) -> ProductResult<Product> {
        let now = OffsetDateTime::now_utc();
        let Some(product) = self.store.set_active(id, true, Some(now)).await? else {
            return Err(self.unless_missing(id, ProductError::AlreadyActive).await);
        };
        info!(product_id = %id, "product reactivated");
        Ok(product)
    }

    pub async fn permanent_delete(&self, id: Uuid) -> ProductResult<()> {
        if !self.store.delete_inactive(id).await? {
            return Err(self.unless_missing(id, ProductError::StillActive).await);
        }
        info!(product_id = %id, "product deleted permanently");
        Ok(())
    }

    async fn load_active(&self, id: Uuid) -> ProductResult<Product> {
        match self.store.find_by_id(id, ActivityScope::Any).await? {
            None => Err(ProductError::NotFound),
            Some(p) if !p.is_active => {
                debug!(product_id = %id, "rejecting change to inactive product");
                Err(ProductError::Inactive)
            }
            Some(p) => Ok(p),
        }
    }

    // The write is conditional on the active flag, so a deactivation that lands
    // after `load_active` makes it match nothing instead of reviving the row.
    async fn save_fields(&self, mut product: Product) -> ProductResult<Product> {
        product.updated_at = OffsetDateTime::now_utc();
        match self.store.update_fields(&product).await? {
            Some(saved) => Ok(saved),
            None => Err(self.unless_missing(product.id, ProductError::Inactive).await),
        }
    }

    /// Explains a conditional write that matched no row: `NotFound` if the row is gone, else `state_err`.
    async fn unless_missing(&self, id: Uuid, state_err: ProductError) -> ProductError {
        match self.store.find_by_id(id, ActivityScope::Any).await {
            Ok(Some(_)) => state_err,
            Ok(None) => ProductError::NotFound,
            Err(e) => ProductError::Store(e),
        }
    }
}
