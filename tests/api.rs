//! Router tests over the in-memory store: status codes, messages, and what was persisted.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use ecommerce_api::config::DEFAULT_BODY_LIMIT;
use ecommerce_api::password::verify_password;
use ecommerce_api::{app, AppState, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> (Router, Arc<MemoryStore>) {
    test_app_with_limit(DEFAULT_BODY_LIMIT)
}

fn test_app_with_limit(body_limit: usize) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
    };
    (app(state, body_limit), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

async fn add_customer(app: &Router, name: &str) {
    let (status, _) = post(
        app,
        "/customers",
        json!({"name": name, "email": format!("{}@example.com", name.to_lowercase()), "phone": "555-0100"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn add_product(app: &Router, name: &str, price: f64) {
    let (status, _) = post(app, "/products", json!({"name": name, "price": price})).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn liveness_and_health() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("Ahoy! Welcome Aboard!"));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn openapi_document_lists_entity_paths() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/customers"].is_object());
    assert!(body["paths"]["/orders/{order_id}/products/{product_id}"].is_object());
}

#[tokio::test]
async fn created_customer_is_listed_and_fetchable() {
    let (app, _) = test_app();
    let (status, body) = post(
        &app,
        "/customers",
        json!({"name": "Ada", "email": "ada@example.com", "phone": "555-0100"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "New customer added successfully"}));

    let (status, body) = get(&app, "/customers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"customer_id": 1, "name": "Ada", "email": "ada@example.com", "phone": "555-0100"}])
    );

    let (status, body) = get(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn missing_name_is_rejected_and_nothing_is_stored() {
    let (app, _) = test_app();
    let (status, body) = post(&app, "/customers", json!({"email": "x@example.com", "phone": "1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"name": ["Missing data for required field."]}));

    let (_, body) = get(&app, "/customers").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn unknown_field_and_malformed_json_are_rejected() {
    let (app, _) = test_app();
    let (status, body) = post(
        &app,
        "/customers",
        json!({"name": "Ada", "email": "a@example.com", "phone": "1", "vip": true}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"vip": ["Unknown field."]}));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_overwrites_all_fields_and_ignores_body_id() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    let (status, body) = put(
        &app,
        "/customers/1",
        json!({"customer_id": 99, "name": "Ada L", "email": "lovelace@example.com", "phone": "555-0199"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Customer details updated successfully"}));

    let (_, body) = get(&app, "/customers/1").await;
    assert_eq!(
        body,
        json!({"customer_id": 1, "name": "Ada L", "email": "lovelace@example.com", "phone": "555-0199"})
    );
    let (status, _) = get(&app, "/customers/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_of_missing_customer_is_404_and_changes_nothing() {
    let (app, _) = test_app();
    let (status, body) = put(
        &app,
        "/customers/7",
        json!({"name": "Ghost", "email": "g@example.com", "phone": "0"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Customer not found"}));

    let (_, body) = get(&app, "/customers").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn delete_twice_is_200_then_404() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    let (status, body) = delete(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Customer removed successfully"}));

    let (status, _) = delete(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_with_orders_cannot_be_deleted() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    let (status, _) = post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 1})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = delete(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = get(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_is_case_insensitive_and_sorted_by_price() {
    let (app, _) = test_app();
    add_product(&app, "Teacup", 3.5).await;
    add_product(&app, "Cupcake", 4.0).await;
    add_product(&app, "Plate", 2.0).await;

    let (status, body) = get(&app, "/products/by-name/cup").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Teacup", "Cupcake"]);

    let (_, body) = get(&app, "/products/by-name/zzz").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn product_price_must_be_a_non_negative_number() {
    let (app, _) = test_app();
    let (status, body) = post(&app, "/products", json!({"name": "Mug", "price": -1.0})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["price"].is_array());

    let (status, body) = post(&app, "/products", json!({"name": "Mug", "price": "cheap"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"price": ["Not a valid number."]}));

    let (_, body) = get(&app, "/products").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn product_update_and_messages() {
    let (app, _) = test_app();
    add_product(&app, "Mug", 4.0).await;
    let (status, body) = put(&app, "/products/1", json!({"name": "Big Mug", "price": 6.25})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Product successfully updated!"}));

    let (_, body) = get(&app, "/products/1").await;
    assert_eq!(body, json!({"product_id": 1, "name": "Big Mug", "price": 6.25}));

    let (status, body) = delete(&app, "/products/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Product not found"}));
}

#[tokio::test]
async fn order_for_customer_is_listed_once() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    add_customer(&app, "Bob").await;
    let (status, body) = post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 2})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "New order has been added successfully"}));

    let (status, body) = get(&app, "/orders/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"order_id": 1, "date": "2024-03-01", "customer_id": 2}]));

    let (status, body) = get(&app, "/orders/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = get(&app, "/orders").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn orders_of_unknown_customer_is_404() {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/orders/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Customer ID 42 does not exist"}));
}

#[tokio::test]
async fn order_for_unknown_customer_is_a_field_error() {
    let (app, _) = test_app();
    let (status, body) = post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"customer_id": ["Customer 5 does not exist."]}));

    let (status, body) = post(&app, "/orders", json!({"date": "03/01/2024", "customer_id": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"date": ["Not a valid date."]}));

    let (_, body) = get(&app, "/orders").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn products_can_be_added_to_and_removed_from_an_order() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    add_product(&app, "Mug", 4.0).await;
    post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 1})).await;

    let (status, body) = post(&app, "/orders/1/products/1", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Product added to order"}));

    let (status, _) = post(&app, "/orders/1/products/1", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = post(&app, "/orders/1/products/9", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Product not found"}));

    let (status, body) = post(&app, "/orders/9/products/1", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Order not found"}));

    let (_, body) = get(&app, "/orders/1/products").await;
    assert_eq!(body, json!([{"product_id": 1, "name": "Mug", "price": 4.0}]));

    let (status, _) = delete(&app, "/products/1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = delete(&app, "/orders/1/products/1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = delete(&app, "/orders/1/products/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Product is not on this order"}));

    let (_, body) = get(&app, "/orders/1/products").await;
    assert_eq!(body, json!([]));
    let (status, _) = get(&app, "/orders/9/products").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn account_password_is_hashed_and_never_returned() {
    let (app, store) = test_app();
    add_customer(&app, "Ada").await;
    let (status, body) = post(
        &app,
        "/accounts",
        json!({"username": "ada", "password": "s3cret!", "customer_id": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Account created successfully"}));

    let (status, body) = get(&app, "/customers/1/account").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"account_id": 1, "username": "ada", "customer_id": 1}));

    let stored = store.stored_password(1).unwrap();
    assert_ne!(stored, "s3cret!");
    assert!(verify_password("s3cret!", &stored));
    assert!(!verify_password("wrong", &stored));
}

#[tokio::test]
async fn account_conflicts_and_missing_customer() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    add_customer(&app, "Bob").await;
    post(&app, "/accounts", json!({"username": "ada", "password": "pw", "customer_id": 1})).await;

    let (status, body) = post(&app, "/accounts", json!({"username": "ada", "password": "pw", "customer_id": 2})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "Username already exists"}));

    let (status, body) = post(&app, "/accounts", json!({"username": "ada2", "password": "pw", "customer_id": 1})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"error": "Customer already has an account"}));

    let (status, body) = post(&app, "/accounts", json!({"username": "ghost", "password": "pw", "customer_id": 9})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"customer_id": ["Customer 9 does not exist."]}));

    let (status, _) = delete(&app, "/customers/1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = delete(&app, "/accounts/1").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = delete(&app, "/accounts/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Account not found"}));
    let (status, _) = get(&app, "/customers/1/account").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, body)
}

#[tokio::test]
async fn oversized_body_is_413_with_error_body() {
    let (app, _) = test_app_with_limit(32);
    let body = json!({"name": "A very long customer name indeed", "email": "a@example.com", "phone": "1"}).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());

    let (_, customers) = get(&app, "/customers").await;
    assert_eq!(customers, json!([]));
}

#[tokio::test]
async fn missing_content_type_is_415_with_error_body() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/products")
        .body(Body::from(json!({"name": "Mug", "price": 4.0}).to_string()))
        .unwrap();
    let (status, body) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn malformed_json_is_400_with_error_body() {
    let (app, _) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"date\": "))
        .unwrap();
    let (status, body) = send_raw(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unparseable_path_ids_are_400_with_error_body() {
    let (app, _) = test_app();
    for (method, uri) in [
        (Method::GET, "/customers/abc"),
        (Method::GET, "/customers/99999999999"),
        (Method::DELETE, "/customers/abc"),
        (Method::GET, "/orders/x"),
        (Method::DELETE, "/orders/1/products/x"),
        (Method::DELETE, "/accounts/abc"),
    ] {
        let request = Request::builder().method(method.clone()).uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send_raw(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert!(body["error"].is_string(), "{} {}", method, uri);
    }
}

#[tokio::test]
async fn whole_number_float_ids_are_accepted() {
    let (app, _) = test_app();
    add_customer(&app, "Ada").await;
    let (status, _) = post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 1.0})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&app, "/orders", json!({"date": "2024-03-01", "customer_id": 1.5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"customer_id": ["Not a valid integer."]}));

    let (_, body) = get(&app, "/orders/1").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}
