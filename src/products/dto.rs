use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewProduct, PageRequest, Product, ProductChanges};
use super::services::{self, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::error::ApiError;

pub const MAX_PAGE_SIZE: i64 = 100;
/// Keeps `(pageNumber - 1) * pageSize` within an i64 offset.
pub const MAX_PAGE_NUMBER: i64 = i64::MAX / MAX_PAGE_SIZE;

/// Product as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: String,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            stock_quantity: p.stock_quantity,
            category: p.category,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Body of POST /products. Missing numbers default to zero and fail validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub category: String,
}

impl CreateProductRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        services::check_name(&self.name)?;
        services::check_price(self.price)?;
        services::check_stock(self.stock_quantity)?;
        Ok(())
    }
}

impl From<CreateProductRequest> for NewProduct {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            price: r.price,
            stock_quantity: r.stock_quantity,
            category: r.category,
        }
    }
}

/// Body of PUT and PATCH /products/{id}.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
}

impl UpdateProductRequest {
    pub fn into_changes(self) -> Result<ProductChanges, ApiError> {
        let changes = ProductChanges {
            name: self.name,
            description: self.description,
            price: self.price,
            stock_quantity: self.stock_quantity,
            category: self.category,
        };
        services::check_changes(&changes)?;
        Ok(changes)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl ListQuery {
    pub fn page(&self) -> Result<PageRequest, ApiError> {
        page_request(self.page_number, self.page_size)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: i32,
    #[serde(default = "default_page_number")]
    pub page_number: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl LowStockQuery {
    pub fn page(&self) -> Result<PageRequest, ApiError> {
        if self.threshold < 0 {
            return Err(ApiError::bad_request("threshold cannot be negative."));
        }
        page_request(self.page_number, self.page_size)
    }
}

fn page_request(page_number: i64, page_size: i64) -> Result<PageRequest, ApiError> {
    if page_number < 1 {
        return Err(ApiError::bad_request("pageNumber must be at least 1."));
    }
    if page_number > MAX_PAGE_NUMBER {
        return Err(ApiError::bad_request("pageNumber is too large."));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(ApiError::bad_request(format!(
            "pageSize must be between 1 and {MAX_PAGE_SIZE}."
        )));
    }
    Ok(PageRequest::new(page_number, page_size))
}

fn default_page_number() -> i64 { 1 }
fn default_page_size() -> i64 { 10 }
fn default_threshold() -> i32 { DEFAULT_LOW_STOCK_THRESHOLD }
