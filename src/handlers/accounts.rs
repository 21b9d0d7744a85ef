//! Customer account handlers. Passwords are hashed before they reach the store.

use crate::error::AppError;
use crate::extractors::json::ValidatedJson;
use crate::extractors::path::Path;
use crate::models::{AccountData, AccountPayload};
use crate::password::hash_password;
use crate::response::{created, ok, ErrorBody, MessageBody};
use crate::state::AppState;
use crate::store::AccountInsert;
use crate::validation::ValidationErrors;
use axum::{
    extract::State,
    response::IntoResponse,
};

#[utoipa::path(
    post,
    path = "/accounts",
    tag = "accounts",
    request_body = AccountPayload,
    responses(
        (status = 201, description = "Account created", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name, including an unknown customer_id"),
        (status = 409, description = "Username taken or customer already has an account", body = ErrorBody)
    )
)]
pub async fn add_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    let data = AccountData {
        password_hash: hash_password(payload.password).await?,
        username: payload.username,
        customer_id: payload.customer_id,
    };
    match state.store.insert_account(&data).await? {
        AccountInsert::Created(account) => {
            tracing::info!(account_id = account.account_id, customer_id = account.customer_id, "account created");
            Ok(created("Account created successfully"))
        }
        AccountInsert::MissingCustomer => Err(ValidationErrors::single(
            "customer_id",
            format!("Customer {} does not exist.", data.customer_id),
        )
        .into()),
        AccountInsert::CustomerHasAccount => Err(AppError::Conflict("Customer already has an account".into())),
        AccountInsert::UsernameTaken => Err(AppError::Conflict("Username already exists".into())),
    }
}

#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    tag = "accounts",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account removed", body = MessageBody),
        (status = 404, description = "No such account", body = ErrorBody)
    )
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_account(id).await? {
        return Err(AppError::NotFound("Account not found".into()));
    }
    Ok(ok("Account removed successfully"))
}
