//! E-commerce REST backend: customers, customer accounts, orders and products on PostgreSQL.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{AppError, ConfigError};
pub use routes::{app, common_routes, docs_routes, shop_routes, ApiDoc};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, MemoryStore, PgStore, Store};
