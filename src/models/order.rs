use crate::validation::{FieldKind, FieldRule, Schema};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Row of `orders`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Order {
    pub order_id: i32,
    pub date: NaiveDate,
    pub customer_id: i32,
}

impl Schema for Order {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("order_id", FieldKind::Integer),
        FieldRule::required("date", FieldKind::Date),
        FieldRule::required("customer_id", FieldKind::Integer),
    ];
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderPayload {
    #[serde(default)]
    pub order_id: Option<i32>,
    pub date: NaiveDate,
    pub customer_id: i32,
}

impl Schema for OrderPayload {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::optional("order_id", FieldKind::Integer),
        FieldRule::required("date", FieldKind::Date),
        FieldRule::required("customer_id", FieldKind::Integer),
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderData {
    pub date: NaiveDate,
    pub customer_id: i32,
}

impl From<OrderPayload> for OrderData {
    fn from(p: OrderPayload) -> Self {
        OrderData {
            date: p.date,
            customer_id: p.customer_id,
        }
    }
}

/// Row of the `order_product` association table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::FromRow)]
pub struct OrderProduct {
    pub order_id: i32,
    pub product_id: i32,
}
