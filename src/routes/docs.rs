//! OpenAPI document for the entity routes.

use crate::handlers::{accounts, customers, orders, products};
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "ecommerce-api", description = "Customers, accounts, orders and products"),
    paths(
        customers::list_customers,
        customers::get_customer,
        customers::add_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::customer_account,
        accounts::add_account,
        accounts::delete_account,
        products::list_products,
        products::get_product,
        products::products_by_name,
        products::add_product,
        products::update_product,
        products::delete_product,
        orders::list_orders,
        orders::orders_by_customer,
        orders::add_order,
        orders::order_products,
        orders::add_order_product,
        orders::remove_order_product,
    ),
    tags(
        (name = "customers"),
        (name = "accounts"),
        (name = "products"),
        (name = "orders")
    )
)]
pub struct ApiDoc;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// GET /openapi.json
pub fn docs_routes() -> Router {
    Router::new().route("/openapi.json", get(openapi))
}
