//! Product handlers, including the name search.

use crate::error::AppError;
use crate::extractors::json::ValidatedJson;
use crate::extractors::path::Path;
use crate::models::{Product, ProductData, ProductPayload};
use crate::response::{created, ok, ErrorBody, MessageBody};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};

const NOT_FOUND: &str = "Product not found";

#[utoipa::path(
    get,
    path = "/products",
    tag = "products",
    responses((status = 200, description = "All products in id order", body = [Product]))
)]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.store.list_products().await?))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Product),
        (status = 404, description = "No such product", body = ErrorBody)
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    state
        .store
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[utoipa::path(
    get,
    path = "/products/by-name/{fragment}",
    tag = "products",
    params(("fragment" = String, Path, description = "Case-insensitive substring of the name")),
    responses((status = 200, description = "Matches ordered by ascending price", body = [Product]))
)]
pub async fn products_by_name(
    State(state): State<AppState>,
    Path(fragment): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(state.store.search_products(&fragment).await?))
}

#[utoipa::path(
    post,
    path = "/products",
    tag = "products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Product created", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name")
    )
)]
pub async fn add_product(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.store.insert_product(&ProductData::from(payload)).await?;
    tracing::info!(product_id = product.product_id, "product created");
    Ok(created("Product added successfully"))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Product overwritten", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name"),
        (status = 404, description = "No such product", body = ErrorBody)
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .store
        .update_product(id, &ProductData::from(payload))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ok("Product successfully updated!"))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "products",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product removed", body = MessageBody),
        (status = 404, description = "No such product", body = ErrorBody),
        (status = 409, description = "Product is on an order", body = ErrorBody)
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_product(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(product_id = id, "product removed");
    Ok(ok("Product removed successfully"))
}
