use crate::validation::{FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row of `products`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub price: f64,
}

impl Schema for Product {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("product_id", FieldKind::Integer),
        FieldRule::required("name", FieldKind::String).non_empty(),
        FieldRule::required("price", FieldKind::Float).minimum(0.0),
    ];
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductPayload {
    #[serde(default)]
    pub product_id: Option<i32>,
    pub name: String,
    pub price: f64,
}

impl Schema for ProductPayload {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::optional("product_id", FieldKind::Integer),
        FieldRule::required("name", FieldKind::String).non_empty(),
        FieldRule::required("price", FieldKind::Float).minimum(0.0),
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductData {
    pub name: String,
    pub price: f64,
}

impl From<ProductPayload> for ProductData {
    fn from(p: ProductPayload) -> Self {
        ProductData {
            name: p.name,
            price: p.price,
        }
    }
}

impl Product {
    pub fn from_data(product_id: i32, data: &ProductData) -> Self {
        Product {
            product_id,
            name: data.name.clone(),
            price: data.price,
        }
    }
}
