//! Entity routes. Segments sharing a position share a parameter name, so
//! `/orders/:id` is the customer id while `/orders/:id/products` is the order id.

use crate::handlers::{accounts, customers, orders, products};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn shop_routes(state: AppState) -> Router {
    Router::new()
        .route("/customers", get(customers::list_customers).post(customers::add_customer))
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/customers/:id/account", get(customers::customer_account))
        .route("/accounts", post(accounts::add_account))
        .route("/accounts/:id", axum::routing::delete(accounts::delete_account))
        .route("/products", get(products::list_products).post(products::add_product))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/by-name/:fragment", get(products::products_by_name))
        .route("/orders", get(orders::list_orders).post(orders::add_order))
        .route("/orders/:id", get(orders::orders_by_customer))
        .route("/orders/:id/products", get(orders::order_products))
        .route(
            "/orders/:id/products/:product_id",
            post(orders::add_order_product).delete(orders::remove_order_product),
        )
        .with_state(state)
}
