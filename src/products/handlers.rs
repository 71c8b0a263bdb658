use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{CreateProductRequest, ListQuery, LowStockQuery, ProductDto, UpdateProductRequest};
use super::repo_types::Product;
use crate::{error::ApiError, response::ApiResponse, state::AppState};

type ApiResult<T> = Result<T, ApiError>;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/low-stock", get(list_low_stock))
        .route("/products/inactive", get(list_inactive))
        .route("/products/inactive/:id", get(get_inactive_product))
        .route("/products/:id", get(get_product))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route(
            "/products/:id",
            put(update_product).patch(patch_product).delete(soft_delete_product),
        )
        .route("/products/:id/reactivate", put(reactivate_product))
        .route("/products/delete/:id", delete(delete_product_permanently))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<ProductDto>>> {
    let Query(q) = query.map_err(bad_request)?;
    let page = q.page()?;
    let products = state.products.list_active(q.category, q.search, page).await?;
    Ok(ApiResponse::ok(
        "Products fetched successfully",
        to_dtos(products),
    ))
}

#[instrument(skip(state))]
pub async fn list_low_stock(
    State(state): State<AppState>,
    query: Result<Query<LowStockQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<ProductDto>>> {
    let Query(q) = query.map_err(bad_request)?;
    let page = q.page()?;
    let products = state
        .products
        .list_low_stock(q.category, q.search, q.threshold, page)
        .await?;
    if products.is_empty() {
        return Err(ApiError::not_found("No low-stock products found."));
    }
    Ok(ApiResponse::ok(
        format!(
            "Low-stock products (stock < {}) retrieved successfully.",
            q.threshold
        ),
        to_dtos(products),
    ))
}

#[instrument(skip(state))]
pub async fn list_inactive(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<Vec<ProductDto>>> {
    let Query(q) = query.map_err(bad_request)?;
    let page = q.page()?;
    let products = state.products.list_inactive(q.category, q.search, page).await?;
    if products.is_empty() {
        return Err(ApiError::not_found("No inactive products found."));
    }
    Ok(ApiResponse::ok(
        "Inactive products retrieved successfully",
        to_dtos(products),
    ))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApiResponse<ProductDto>> {
    let id = product_id(id)?;
    match state.products.get_active_by_id(id).await? {
        Some(p) => Ok(ApiResponse::ok("Product fetched", ProductDto::from(p))),
        None => Err(ApiError::not_found("Product not found")),
    }
}

#[instrument(skip(state))]
pub async fn get_inactive_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApiResponse<ProductDto>> {
    let id = product_id(id)?;
    match state.products.get_inactive_by_id(id).await? {
        Some(p) => Ok(ApiResponse::ok("Inactive product fetched", ProductDto::from(p))),
        None => Err(ApiError::not_found("Inactive product not found")),
    }
}

/// POST /products → 201 with a Location header pointing at the new product.
#[instrument(skip(state, body))]
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body.map_err(bad_request)?;
    body.validate()?;

    let product = state.products.create(body.into()).await?;
    let location = format!("/api/v1/products/{}", product.id);
    info!(product_id = %product.id, "create_product ok");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        ApiResponse::ok("Product created successfully", ProductDto::from(product)),
    ))
}

/// PUT /products/{id}: sent fields overwrite, blank strings included.
#[instrument(skip(state, body))]
pub async fn update_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<ProductDto>> {
    let id = product_id(id)?;
    let Json(body) = body.map_err(bad_request)?;
    let changes = body.into_changes()?;

    let product = state.products.full_update(id, changes).await?;
    Ok(ApiResponse::ok(
        format!("Product with ID {id} updated successfully."),
        ProductDto::from(product),
    ))
}

/// PATCH /products/{id}: only sent, non-blank fields are applied.
#[instrument(skip(state, body))]
pub async fn patch_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<ProductDto>> {
    let id = product_id(id)?;
    let Json(body) = body.map_err(bad_request)?;
    let changes = body.into_changes()?;

    let product = state.products.partial_update(id, changes).await?;
    Ok(ApiResponse::ok(
        "Product updated successfully.",
        ProductDto::from(product),
    ))
}

#[instrument(skip(state))]
pub async fn soft_delete_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApiResponse<()>> {
    let id = product_id(id)?;
    state.products.soft_delete(id).await?;
    Ok(ApiResponse::done("Product deleted successfully"))
}

#[instrument(skip(state))]
pub async fn reactivate_product(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApiResponse<ProductDto>> {
    let id = product_id(id)?;
    let product = state.products.reactivate(id).await?;
    Ok(ApiResponse::ok(
        "Product reactivated successfully.",
        ProductDto::from(product),
    ))
}

#[instrument(skip(state))]
pub async fn delete_product_permanently(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<ApiResponse<()>> {
    let id = product_id(id)?;
    state.products.permanent_delete(id).await?;
    Ok(ApiResponse::done("Product deleted permanently."))
}

fn product_id(id: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    id.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request("Invalid product id."))
}

fn bad_request<E: std::error::Error>(e: E) -> ApiError {
    ApiError::bad_request(e.to_string())
}

fn to_dtos(products: Vec<Product>) -> Vec<ProductDto> {
    products.into_iter().map(ProductDto::from).collect()
}
