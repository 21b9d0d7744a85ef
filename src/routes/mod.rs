//! Route registration and the layered application router.

mod common;
mod docs;
mod shop;

pub use common::{common_routes, WELCOME};
pub use docs::{docs_routes, ApiDoc};
pub use shop::shop_routes;

use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

/// Every route, with request tracing and a cap on buffered request bodies.
/// An over-limit body fails body extraction with 413.
pub fn app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(docs_routes())
        .merge(shop_routes(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}
