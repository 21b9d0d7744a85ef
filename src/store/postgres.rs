//! PostgreSQL store. Reads run on the pool; every mutation opens its own transaction
//! and commits before returning. Dropping an uncommitted transaction rolls it back.

use super::{AccountInsert, LinkOutcome, Store};
use crate::error::AppError;
use crate::models::{
    AccountData, Customer, CustomerAccount, CustomerData, Order, OrderData, Product, ProductData,
};
use async_trait::async_trait;
use sqlx::PgPool;

const CUSTOMER_ACCOUNT_CUSTOMER_KEY: &str = "customer_accounts_customer_id_key";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Escape LIKE wildcards so the fragment matches literally. Pairs with `ESCAPE '\'`.
fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + 2);
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let sql = "SELECT customer_id, name, email, phone FROM customers ORDER BY customer_id";
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(sql).fetch_all(&self.pool).await?)
    }

    async fn get_customer(&self, id: i32) -> Result<Option<Customer>, AppError> {
        let sql = "SELECT customer_id, name, email, phone FROM customers WHERE customer_id = $1";
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_customer(&self, data: &CustomerData) -> Result<Customer, AppError> {
        let sql = "INSERT INTO customers (name, email, phone) VALUES ($1, $2, $3) \
                   RETURNING customer_id, name, email, phone";
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let customer: Customer = sqlx::query_as(sql)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.phone)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(customer)
    }

    async fn update_customer(&self, id: i32, data: &CustomerData) -> Result<Option<Customer>, AppError> {
        let mut tx = self.pool.begin().await?;
        let existing: Option<Customer> =
            sqlx::query_as("SELECT customer_id, name, email, phone FROM customers WHERE customer_id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }
        let sql = "UPDATE customers SET name = $1, email = $2, phone = $3 WHERE customer_id = $4 \
                   RETURNING customer_id, name, email, phone";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let customer: Customer = sqlx::query_as(sql)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.phone)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(customer))
    }

    async fn delete_customer(&self, id: i32) -> Result<bool, AppError> {
        let sql = "DELETE FROM customers WHERE customer_id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let sql = "SELECT product_id, name, price FROM products ORDER BY product_id";
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(sql).fetch_all(&self.pool).await?)
    }

    async fn get_product(&self, id: i32) -> Result<Option<Product>, AppError> {
        let sql = "SELECT product_id, name, price FROM products WHERE product_id = $1";
        tracing::debug!(sql = %sql, id, "query");
        Ok(sqlx::query_as(sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_product(&self, data: &ProductData) -> Result<Product, AppError> {
        let sql = "INSERT INTO products (name, price) VALUES ($1, $2) RETURNING product_id, name, price";
        tracing::debug!(sql = %sql, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let product: Product = sqlx::query_as(sql)
            .bind(&data.name)
            .bind(data.price)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn update_product(&self, id: i32, data: &ProductData) -> Result<Option<Product>, AppError> {
        let mut tx = self.pool.begin().await?;
        let existing: Option<Product> =
            sqlx::query_as("SELECT product_id, name, price FROM products WHERE product_id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Ok(None);
        }
        let sql = "UPDATE products SET name = $1, price = $2 WHERE product_id = $3 \
                   RETURNING product_id, name, price";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let product: Product = sqlx::query_as(sql)
            .bind(&data.name)
            .bind(data.price)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: i32) -> Result<bool, AppError> {
        let sql = "DELETE FROM products WHERE product_id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_products(&self, fragment: &str) -> Result<Vec<Product>, AppError> {
        let sql = "SELECT product_id, name, price FROM products WHERE name ILIKE $1 ESCAPE '\\' \
                   ORDER BY price ASC, product_id ASC";
        let pattern = format!("%{}%", escape_like(fragment));
        tracing::debug!(sql = %sql, pattern = %pattern, "query");
        Ok(sqlx::query_as(sql).bind(pattern).fetch_all(&self.pool).await?)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        let sql = "SELECT order_id, date, customer_id FROM orders ORDER BY order_id";
        tracing::debug!(sql = %sql, "query");
        Ok(sqlx::query_as(sql).fetch_all(&self.pool).await?)
    }

    async fn orders_for_customer(&self, customer_id: i32) -> Result<Vec<Order>, AppError> {
        let sql = "SELECT order_id, date, customer_id FROM orders WHERE customer_id = $1 ORDER BY order_id";
        tracing::debug!(sql = %sql, customer_id, "query");
        Ok(sqlx::query_as(sql).bind(customer_id).fetch_all(&self.pool).await?)
    }

    async fn insert_order(&self, data: &OrderData) -> Result<Option<Order>, AppError> {
        let mut tx = self.pool.begin().await?;
        let customer: Option<i32> = sqlx::query_scalar("SELECT customer_id FROM customers WHERE customer_id = $1")
            .bind(data.customer_id)
            .fetch_optional(&mut *tx)
            .await?;
        if customer.is_none() {
            return Ok(None);
        }
        let sql = "INSERT INTO orders (date, customer_id) VALUES ($1, $2) RETURNING order_id, date, customer_id";
        tracing::debug!(sql = %sql, customer_id = data.customer_id, "query (tx)");
        let order: Order = sqlx::query_as(sql)
            .bind(data.date)
            .bind(data.customer_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(order))
    }

    async fn products_for_order(&self, order_id: i32) -> Result<Option<Vec<Product>>, AppError> {
        let order: Option<i32> = sqlx::query_scalar("SELECT order_id FROM orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        if order.is_none() {
            return Ok(None);
        }
        let sql = "SELECT p.product_id, p.name, p.price FROM products p \
                   JOIN order_product op ON op.product_id = p.product_id \
                   WHERE op.order_id = $1 ORDER BY p.product_id";
        tracing::debug!(sql = %sql, order_id, "query");
        let products: Vec<Product> = sqlx::query_as(sql).bind(order_id).fetch_all(&self.pool).await?;
        Ok(Some(products))
    }

    async fn link_product(&self, order_id: i32, product_id: i32) -> Result<LinkOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        let order: Option<i32> = sqlx::query_scalar("SELECT order_id FROM orders WHERE order_id = $1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Ok(LinkOutcome::MissingOrder);
        }
        let product: Option<i32> = sqlx::query_scalar("SELECT product_id FROM products WHERE product_id = $1")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?;
        if product.is_none() {
            return Ok(LinkOutcome::MissingProduct);
        }
        let sql = "INSERT INTO order_product (order_id, product_id) VALUES ($1, $2) ON CONFLICT DO NOTHING";
        tracing::debug!(sql = %sql, order_id, product_id, "query (tx)");
        let result = sqlx::query(sql).bind(order_id).bind(product_id).execute(&mut *tx).await?;
        tx.commit().await?;
        if result.rows_affected() == 0 {
            Ok(LinkOutcome::AlreadyLinked)
        } else {
            Ok(LinkOutcome::Linked)
        }
    }

    async fn unlink_product(&self, order_id: i32, product_id: i32) -> Result<bool, AppError> {
        let sql = "DELETE FROM order_product WHERE order_id = $1 AND product_id = $2";
        tracing::debug!(sql = %sql, order_id, product_id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(sql).bind(order_id).bind(product_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_account(&self, data: &AccountData) -> Result<AccountInsert, AppError> {
        let mut tx = self.pool.begin().await?;
        let customer: Option<i32> = sqlx::query_scalar("SELECT customer_id FROM customers WHERE customer_id = $1")
            .bind(data.customer_id)
            .fetch_optional(&mut *tx)
            .await?;
        if customer.is_none() {
            return Ok(AccountInsert::MissingCustomer);
        }
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT account_id FROM customer_accounts WHERE customer_id = $1")
                .bind(data.customer_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Ok(AccountInsert::CustomerHasAccount);
        }
        let sql = "INSERT INTO customer_accounts (username, password, customer_id) VALUES ($1, $2, $3) \
                   RETURNING account_id, username, customer_id";
        tracing::debug!(sql = %sql, customer_id = data.customer_id, "query (tx)");
        let inserted = sqlx::query_as::<_, CustomerAccount>(sql)
            .bind(&data.username)
            .bind(&data.password_hash)
            .bind(data.customer_id)
            .fetch_one(&mut *tx)
            .await;
        let account = match inserted {
            Ok(account) => account,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Ok(if e.constraint() == Some(CUSTOMER_ACCOUNT_CUSTOMER_KEY) {
                    AccountInsert::CustomerHasAccount
                } else {
                    AccountInsert::UsernameTaken
                });
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(AccountInsert::Created(account))
    }

    async fn account_for_customer(&self, customer_id: i32) -> Result<Option<CustomerAccount>, AppError> {
        let sql = "SELECT account_id, username, customer_id FROM customer_accounts WHERE customer_id = $1";
        tracing::debug!(sql = %sql, customer_id, "query");
        Ok(sqlx::query_as(sql).bind(customer_id).fetch_optional(&self.pool).await?)
    }

    async fn delete_account(&self, id: i32) -> Result<bool, AppError> {
        let sql = "DELETE FROM customer_accounts WHERE account_id = $1";
        tracing::debug!(sql = %sql, id, "query (tx)");
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
