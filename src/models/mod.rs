//! Entity model: table-backed records, request payloads, and the field sets each
//! mutation writes. Relationships are foreign-key ids; joins happen in the store.

pub mod account;
pub mod customer;
pub mod order;
pub mod product;

pub use account::{AccountData, AccountPayload, CustomerAccount};
pub use customer::{Customer, CustomerData, CustomerPayload};
pub use order::{Order, OrderData, OrderPayload, OrderProduct};
pub use product::{Product, ProductData, ProductPayload};
