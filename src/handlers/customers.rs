//! Customer handlers: list, fetch, create, update, delete, and the customer's account.

use crate::error::AppError;
use crate::extractors::json::ValidatedJson;
use crate::extractors::path::Path;
use crate::models::{Customer, CustomerAccount, CustomerData, CustomerPayload};
use crate::response::{created, ok, ErrorBody, MessageBody};
use crate::state::AppState;
use axum::{
    extract::State,
    response::IntoResponse,
    Json,
};

const NOT_FOUND: &str = "Customer not found";

#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses((status = 200, description = "All customers in id order", body = [Customer]))
)]
pub async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, AppError> {
    Ok(Json(state.store.list_customers().await?))
}

#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer", body = Customer),
        (status = 404, description = "No such customer", body = ErrorBody)
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Customer>, AppError> {
    state
        .store
        .get_customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name")
    )
)]
pub async fn add_customer(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state.store.insert_customer(&CustomerData::from(payload)).await?;
    tracing::info!(customer_id = customer.customer_id, "customer created");
    Ok(created("New customer added successfully"))
}

#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Customer overwritten", body = MessageBody),
        (status = 400, description = "Field errors keyed by field name"),
        (status = 404, description = "No such customer", body = ErrorBody)
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<CustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    state
        .store
        .update_customer(id, &CustomerData::from(payload))
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    Ok(ok("Customer details updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer removed", body = MessageBody),
        (status = 404, description = "No such customer", body = ErrorBody),
        (status = 409, description = "Customer still has orders or an account", body = ErrorBody)
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_customer(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    tracing::info!(customer_id = id, "customer removed");
    Ok(ok("Customer removed successfully"))
}

#[utoipa::path(
    get,
    path = "/customers/{id}/account",
    tag = "accounts",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "The customer's account", body = CustomerAccount),
        (status = 404, description = "Customer has no account", body = ErrorBody)
    )
)]
pub async fn customer_account(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CustomerAccount>, AppError> {
    state
        .store
        .account_for_customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Account not found".into()))
}
