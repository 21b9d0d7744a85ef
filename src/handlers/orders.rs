//! Order handlers and the order/product association.

use crate::error::AppError;
use crate::extractors::json::ValidatedJson;
use crate::extractors::path::Path;
use crate::models::{Order, OrderData, OrderPayload, Product};
use crate::response::{created, ok, ErrorBody, MessageBody};
use crate::state::AppState;
use crate::store::LinkOutcome;
use crate::validation::ValidationErrors;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    responses((status = 200, description = "All orders in id order", body = [Order]))
)]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.store.list_orders().await?))
}

/// Orders of one customer. An unknown customer is a 404; a known one with no orders is `[]`.
#[utoipa::path(
    get,
    path = "/orders/{customer_id}",
    tag = "orders",
    params(("customer_id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer's orders, possibly empty", body = [Order]),
        (status = 404, description = "No such customer", body = ErrorBody)
    )
)]
pub async fn orders_by_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i32>,
) -> Result<Json<Vec<Order>>, AppError> {
    if state.store.get_customer(customer_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Customer ID {} does not exist", customer_id)));
    }
    Ok(Json(state.store.orders_for_customer(customer_id).await?))
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body = OrderPayload,
    responses(
        (status = 201, description = "Order created", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name, including an unknown customer_id")
    )
)]
pub async fn add_order(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<OrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let data = OrderData::from(payload);
    let order = state.store.insert_order(&data).await?.ok_or_else(|| {
        ValidationErrors::single("customer_id", format!("Customer {} does not exist.", data.customer_id))
    })?;
    tracing::info!(order_id = order.order_id, customer_id = order.customer_id, "order created");
    Ok(created("New order has been added successfully"))
}

#[utoipa::path(
    get,
    path = "/orders/{order_id}/products",
    tag = "orders",
    params(("order_id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Products on the order in id order", body = [Product]),
        (status = 404, description = "No such order", body = ErrorBody)
    )
)]
pub async fn order_products(
    State(state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<Json<Vec<Product>>, AppError> {
    state
        .store
        .products_for_order(order_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".into()))
}

#[utoipa::path(
    post,
    path = "/orders/{order_id}/products/{product_id}",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order id"),
        ("product_id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 201, description = "Product added to the order", body = MessageBody),
        (status = 404, description = "No such order or product", body = ErrorBody),
        (status = 409, description = "Product already on the order", body = ErrorBody)
    )
)]
pub async fn add_order_product(
    State(state): State<AppState>,
    Path((order_id, product_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    match state.store.link_product(order_id, product_id).await? {
        LinkOutcome::Linked => {
            tracing::info!(order_id, product_id, "product added to order");
            Ok(created("Product added to order"))
        }
        LinkOutcome::AlreadyLinked => Err(AppError::Conflict("Product is already on this order".into())),
        LinkOutcome::MissingOrder => Err(AppError::NotFound("Order not found".into())),
        LinkOutcome::MissingProduct => Err(AppError::NotFound("Product not found".into())),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{order_id}/products/{product_id}",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order id"),
        ("product_id" = i32, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product removed from the order", body = MessageBody),
        (status = 404, description = "Product is not on the order", body = ErrorBody)
    )
)]
pub async fn remove_order_product(
    State(state): State<AppState>,
    Path((order_id, product_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.unlink_product(order_id, product_id).await? {
        return Err(AppError::NotFound("Product is not on this order".into()));
    }
    Ok(ok("Product removed from order"))
}
