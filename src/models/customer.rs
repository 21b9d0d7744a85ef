use crate::validation::{FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row of `customers`. `email` and `phone` are nullable columns; rows written
/// through the API always carry both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Customer {
    pub customer_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Schema for Customer {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("customer_id", FieldKind::Integer),
        FieldRule::required("name", FieldKind::String).non_empty(),
        FieldRule::optional("email", FieldKind::String).nullable(),
        FieldRule::optional("phone", FieldKind::String).nullable(),
    ];
}

/// Body of `POST /customers` and `PUT /customers/{id}`. The id is accepted but never written.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CustomerPayload {
    #[serde(default)]
    pub customer_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Schema for CustomerPayload {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::optional("customer_id", FieldKind::Integer),
        FieldRule::required("name", FieldKind::String).non_empty(),
        FieldRule::required("email", FieldKind::String),
        FieldRule::required("phone", FieldKind::String),
    ];
}

/// Columns written on insert and overwritten on update.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomerData {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<CustomerPayload> for CustomerData {
    fn from(p: CustomerPayload) -> Self {
        CustomerData {
            name: p.name,
            email: p.email,
            phone: p.phone,
        }
    }
}

impl Customer {
    pub fn from_data(customer_id: i32, data: &CustomerData) -> Self {
        Customer {
            customer_id,
            name: data.name.clone(),
            email: Some(data.email.clone()),
            phone: Some(data.phone.clone()),
        }
    }
}
