use rust_decimal::Decimal;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Product record in the database.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields supplied when creating a product; id and timestamps are assigned by the service.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
}

/// Fields supplied by an update or patch. `None` means the caller did not send the field.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
}

/// Which side of the active flag a lookup is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityScope {
    Active,
    Inactive,
    Any,
}

/// Predicates for list queries. All set predicates are ANDed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    pub active: bool,
    pub category: Option<String>,
    pub search: Option<String>,
    pub stock_below: Option<i32>,
}

impl ProductFilter {
    /// Blank category or search terms are treated as absent.
    pub fn new(active: bool, category: Option<String>, search: Option<String>) -> Self {
        Self {
            active,
            category: non_blank(category),
            search: non_blank(search),
            stock_below: None,
        }
    }

    pub fn with_stock_below(mut self, threshold: i32) -> Self {
        self.stock_below = Some(threshold);
        self
    }
}

/// 1-based page request. Callers validate ranges before building one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
