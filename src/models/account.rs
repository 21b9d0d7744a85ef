use crate::validation::{FieldKind, FieldRule, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Row of `customer_accounts` without the password column, which is never read back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CustomerAccount {
    pub account_id: i32,
    pub username: String,
    pub customer_id: i32,
}

impl Schema for CustomerAccount {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("account_id", FieldKind::Integer),
        FieldRule::required("username", FieldKind::String).non_empty(),
        FieldRule::required("customer_id", FieldKind::Integer),
    ];
}

#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountPayload {
    #[serde(default)]
    pub account_id: Option<i32>,
    pub username: String,
    pub password: String,
    pub customer_id: i32,
}

impl fmt::Debug for AccountPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountPayload")
            .field("account_id", &self.account_id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("customer_id", &self.customer_id)
            .finish()
    }
}

impl Schema for AccountPayload {
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::optional("account_id", FieldKind::Integer),
        FieldRule::required("username", FieldKind::String).non_empty(),
        FieldRule::required("password", FieldKind::String).non_empty(),
        FieldRule::required("customer_id", FieldKind::Integer),
    ];
}

/// Columns written on insert; `password_hash` is a PHC string.
#[derive(Clone, PartialEq)]
pub struct AccountData {
    pub username: String,
    pub password_hash: String,
    pub customer_id: i32,
}

impl fmt::Debug for AccountData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountData")
            .field("username", &self.username)
            .field("customer_id", &self.customer_id)
            .finish_non_exhaustive()
    }
}
