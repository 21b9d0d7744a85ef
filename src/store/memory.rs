//! In-process store with the same observable behavior as [`super::PgStore`]: serial ids,
//! id ordering, unique usernames, and foreign keys that block deleting referenced rows.
//! Every call holds one mutex for its whole duration.

use super::{AccountInsert, LinkOutcome, Store};
use crate::error::AppError;
use crate::models::{
    AccountData, Customer, CustomerAccount, CustomerData, Order, OrderData, OrderProduct, Product,
    ProductData,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

const STILL_REFERENCED: &str = "the record is still referenced or references a missing record";

#[derive(Default)]
struct Sequences {
    customer: i32,
    account: i32,
    order: i32,
    product: i32,
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

struct StoredAccount {
    account: CustomerAccount,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    customers: BTreeMap<i32, Customer>,
    accounts: BTreeMap<i32, StoredAccount>,
    orders: BTreeMap<i32, Order>,
    products: BTreeMap<i32, Product>,
    links: BTreeSet<OrderProduct>,
    seq: Sequences,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The stored password column for an account.
    pub fn stored_password(&self, account_id: i32) -> Option<String> {
        self.tables()
            .accounts
            .get(&account_id)
            .map(|a| a.password_hash.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        Ok(self.tables().customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: i32) -> Result<Option<Customer>, AppError> {
        Ok(self.tables().customers.get(&id).cloned())
    }

    async fn insert_customer(&self, data: &CustomerData) -> Result<Customer, AppError> {
        let mut t = self.tables();
        let id = next(&mut t.seq.customer);
        let customer = Customer::from_data(id, data);
        t.customers.insert(id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(&self, id: i32, data: &CustomerData) -> Result<Option<Customer>, AppError> {
        let mut t = self.tables();
        Ok(t.customers.get_mut(&id).map(|row| {
            *row = Customer::from_data(id, data);
            row.clone()
        }))
    }

    async fn delete_customer(&self, id: i32) -> Result<bool, AppError> {
        let mut t = self.tables();
        let referenced = t.orders.values().any(|o| o.customer_id == id)
            || t.accounts.values().any(|a| a.account.customer_id == id);
        if referenced && t.customers.contains_key(&id) {
            return Err(AppError::Conflict(STILL_REFERENCED.into()));
        }
        Ok(t.customers.remove(&id).is_some())
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.tables().products.values().cloned().collect())
    }

    async fn get_product(&self, id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.tables().products.get(&id).cloned())
    }

    async fn insert_product(&self, data: &ProductData) -> Result<Product, AppError> {
        let mut t = self.tables();
        let id = next(&mut t.seq.product);
        let product = Product::from_data(id, data);
        t.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i32, data: &ProductData) -> Result<Option<Product>, AppError> {
        let mut t = self.tables();
        Ok(t.products.get_mut(&id).map(|row| {
            *row = Product::from_data(id, data);
            row.clone()
        }))
    }

    async fn delete_product(&self, id: i32) -> Result<bool, AppError> {
        let mut t = self.tables();
        if t.links.iter().any(|l| l.product_id == id) {
            return Err(AppError::Conflict(STILL_REFERENCED.into()));
        }
        Ok(t.products.remove(&id).is_some())
    }

    async fn search_products(&self, fragment: &str) -> Result<Vec<Product>, AppError> {
        let needle = fragment.to_lowercase();
        let mut found: Vec<Product> = self
            .tables()
            .products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.price.total_cmp(&b.price).then(a.product_id.cmp(&b.product_id)));
        Ok(found)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, AppError> {
        Ok(self.tables().orders.values().cloned().collect())
    }

    async fn orders_for_customer(&self, customer_id: i32) -> Result<Vec<Order>, AppError> {
        Ok(self
            .tables()
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn insert_order(&self, data: &OrderData) -> Result<Option<Order>, AppError> {
        let mut t = self.tables();
        if !t.customers.contains_key(&data.customer_id) {
            return Ok(None);
        }
        let id = next(&mut t.seq.order);
        let order = Order {
            order_id: id,
            date: data.date,
            customer_id: data.customer_id,
        };
        t.orders.insert(id, order.clone());
        Ok(Some(order))
    }

    async fn products_for_order(&self, order_id: i32) -> Result<Option<Vec<Product>>, AppError> {
        let t = self.tables();
        if !t.orders.contains_key(&order_id) {
            return Ok(None);
        }
        let products = t
            .links
            .iter()
            .filter(|l| l.order_id == order_id)
            .filter_map(|l| t.products.get(&l.product_id).cloned())
            .collect();
        Ok(Some(products))
    }

    async fn link_product(&self, order_id: i32, product_id: i32) -> Result<LinkOutcome, AppError> {
        let mut t = self.tables();
        if !t.orders.contains_key(&order_id) {
            return Ok(LinkOutcome::MissingOrder);
        }
        if !t.products.contains_key(&product_id) {
            return Ok(LinkOutcome::MissingProduct);
        }
        if t.links.insert(OrderProduct { order_id, product_id }) {
            Ok(LinkOutcome::Linked)
        } else {
            Ok(LinkOutcome::AlreadyLinked)
        }
    }

    async fn unlink_product(&self, order_id: i32, product_id: i32) -> Result<bool, AppError> {
        Ok(self.tables().links.remove(&OrderProduct { order_id, product_id }))
    }

    async fn insert_account(&self, data: &AccountData) -> Result<AccountInsert, AppError> {
        let mut t = self.tables();
        if !t.customers.contains_key(&data.customer_id) {
            return Ok(AccountInsert::MissingCustomer);
        }
        if t.accounts.values().any(|a| a.account.customer_id == data.customer_id) {
            return Ok(AccountInsert::CustomerHasAccount);
        }
        if t.accounts.values().any(|a| a.account.username == data.username) {
            return Ok(AccountInsert::UsernameTaken);
        }
        let id = next(&mut t.seq.account);
        let account = CustomerAccount {
            account_id: id,
            username: data.username.clone(),
            customer_id: data.customer_id,
        };
        t.accounts.insert(
            id,
            StoredAccount {
                account: account.clone(),
                password_hash: data.password_hash.clone(),
            },
        );
        Ok(AccountInsert::Created(account))
    }

    async fn account_for_customer(&self, customer_id: i32) -> Result<Option<CustomerAccount>, AppError> {
        Ok(self
            .tables()
            .accounts
            .values()
            .find(|a| a.account.customer_id == customer_id)
            .map(|a| a.account.clone()))
    }

    async fn delete_account(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.tables().accounts.remove(&id).is_some())
    }
}
