//! Persistence gateway: the [`Store`] trait handlers call, table DDL, and database bootstrap.
//! Every mutation is one unit of work; a read that matches nothing is `Ok(None)` or an empty `Vec`.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::{
    AccountData, Customer, CustomerAccount, CustomerData, Order, OrderData, Product, ProductData,
};
use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Result of linking a product to an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
    MissingOrder,
    MissingProduct,
}

/// Result of creating a customer account.
#[derive(Clone, Debug, PartialEq)]
pub enum AccountInsert {
    Created(CustomerAccount),
    MissingCustomer,
    CustomerHasAccount,
    UsernameTaken,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;
    async fn get_customer(&self, id: i32) -> Result<Option<Customer>, AppError>;
    async fn insert_customer(&self, data: &CustomerData) -> Result<Customer, AppError>;
    /// Load and overwrite in one transaction. `None` when the id does not exist.
    async fn update_customer(&self, id: i32, data: &CustomerData) -> Result<Option<Customer>, AppError>;
    /// `false` when no row was deleted.
    async fn delete_customer(&self, id: i32) -> Result<bool, AppError>;

    async fn list_products(&self) -> Result<Vec<Product>, AppError>;
    async fn get_product(&self, id: i32) -> Result<Option<Product>, AppError>;
    async fn insert_product(&self, data: &ProductData) -> Result<Product, AppError>;
    async fn update_product(&self, id: i32, data: &ProductData) -> Result<Option<Product>, AppError>;
    async fn delete_product(&self, id: i32) -> Result<bool, AppError>;
    /// Case-insensitive substring match on name, cheapest first.
    async fn search_products(&self, fragment: &str) -> Result<Vec<Product>, AppError>;

    async fn list_orders(&self) -> Result<Vec<Order>, AppError>;
    async fn orders_for_customer(&self, customer_id: i32) -> Result<Vec<Order>, AppError>;
    /// `None` when the referenced customer does not exist.
    async fn insert_order(&self, data: &OrderData) -> Result<Option<Order>, AppError>;
    /// `None` when the order does not exist.
    async fn products_for_order(&self, order_id: i32) -> Result<Option<Vec<Product>>, AppError>;
    async fn link_product(&self, order_id: i32, product_id: i32) -> Result<LinkOutcome, AppError>;
    async fn unlink_product(&self, order_id: i32, product_id: i32) -> Result<bool, AppError>;

    async fn insert_account(&self, data: &AccountData) -> Result<AccountInsert, AppError>;
    async fn account_for_customer(&self, customer_id: i32) -> Result<Option<CustomerAccount>, AppError>;
    async fn delete_account(&self, id: i32) -> Result<bool, AppError>;
}

/// Table DDL in dependency order. Tables are created if absent and never dropped.
const TABLES: &[(&str, &str)] = &[
    (
        "customers",
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            customer_id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(320),
            phone VARCHAR(15)
        )
        "#,
    ),
    (
        "customer_accounts",
        r#"
        CREATE TABLE IF NOT EXISTS customer_accounts (
            account_id SERIAL PRIMARY KEY,
            username VARCHAR(255) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL,
            customer_id INTEGER UNIQUE REFERENCES customers (customer_id)
        )
        "#,
    ),
    (
        "orders",
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            order_id SERIAL PRIMARY KEY,
            date DATE NOT NULL,
            customer_id INTEGER REFERENCES customers (customer_id)
        )
        "#,
    ),
    (
        "products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            product_id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            price DOUBLE PRECISION NOT NULL
        )
        "#,
    ),
    (
        "order_product",
        r#"
        CREATE TABLE IF NOT EXISTS order_product (
            order_id INTEGER NOT NULL REFERENCES orders (order_id),
            product_id INTEGER NOT NULL REFERENCES products (product_id),
            PRIMARY KEY (order_id, product_id)
        )
        "#,
    ),
];

/// Create every table that does not exist yet.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for (name, ddl) in TABLES {
        tracing::debug!(table = %name, "ensure table");
        sqlx::query(ddl).execute(pool).await?;
    }
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin, db_name) = admin_options(database_url)?;
    let Some(db_name) = db_name else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Options for the `postgres` maintenance database on the same server, and the
/// target database name when it is one that may need creating.
fn admin_options(database_url: &str) -> Result<(PgConnectOptions, Option<String>), AppError> {
    let options = PgConnectOptions::from_str(database_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let db_name = options
        .get_database()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "postgres")
        .map(str::to_owned);
    Ok((options.database("postgres"), db_name))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_options_target_postgres_on_the_same_server() {
        let (admin, name) = admin_options("postgres://u:p@db:5432/shop?sslmode=disable").unwrap();
        assert_eq!(name.as_deref(), Some("shop"));
        assert_eq!(admin.get_database(), Some("postgres"));
        assert_eq!(admin.get_host(), "db");
        assert_eq!(admin.get_port(), 5432);
        assert_eq!(admin.get_username(), "u");
    }

    #[test]
    fn url_without_database_keeps_host_and_port() {
        let (admin, name) = admin_options("postgres://user:pw@localhost:5432").unwrap();
        assert_ne!(name.as_deref(), Some("user:pw@localhost:5432"));
        assert_eq!(admin.get_host(), "localhost");
        assert_eq!(admin.get_port(), 5432);
        assert_eq!(admin.get_username(), "user");
        assert_eq!(admin.get_database(), Some("postgres"));
    }

    #[test]
    fn maintenance_database_is_never_created() {
        let (_, name) = admin_options("postgres://localhost/postgres").unwrap();
        assert_eq!(name, None);
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(admin_options("not a url").is_err());
    }

    #[test]
    fn identifiers_are_double_quoted() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn tables_are_created_parents_first() {
        let names: Vec<&str> = TABLES.iter().map(|(n, _)| *n).collect();
        let pos = |t: &str| names.iter().position(|n| *n == t).unwrap();
        assert!(pos("customers") < pos("orders"));
        assert!(pos("customers") < pos("customer_accounts"));
        assert!(pos("orders") < pos("order_product"));
        assert!(pos("products") < pos("order_product"));
        assert!(TABLES.iter().all(|(_, ddl)| ddl.contains("IF NOT EXISTS")));
    }
}
