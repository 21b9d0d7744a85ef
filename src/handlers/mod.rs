//! HTTP handlers, one per (entity, operation).

pub mod accounts;
pub mod customers;
pub mod orders;
pub mod products;
