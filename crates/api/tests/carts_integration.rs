//! Integration tests for cart endpoints.
//!
//! These tests require a running PostgreSQL instance.
//! Set TEST_DATABASE_URL or use the default local test database.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, create_test_couple, create_test_gift, create_test_list, create_test_pool,
    force_cart_paid, get_request, json_request, parse_response_body, run_migrations,
    unique_session_id,
};
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_get_cart_creates_empty_cart() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let session = unique_session_id();
    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!("/api/v1/carts/{}", session)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["session_id"], session);
    assert_eq!(body["is_paid"], false);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_item_and_total() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(50000, 2), 5).await;

    let session = unique_session_id();
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", session),
            json!({ "gift_id": gift.id, "quantity": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = parse_response_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["unit_price"], "500.00");
    assert_eq!(items[0]["line_total"], "1000.00");
    assert_eq!(body["total_amount"], "1000.00");
}

#[tokio::test]
async fn test_add_same_gift_merges_quantities() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(2500, 2), 10).await;

    let session = unique_session_id();
    for _ in 0..2 {
        let response = test
            .app
            .clone()
            .oneshot(json_request(
                Method::POST,
                &format!("/api/v1/carts/{}/items", session),
                json!({ "gift_id": gift.id, "quantity": 1 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!("/api/v1/carts/{}", session)))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
}

#[tokio::test]
async fn test_add_unknown_gift_returns_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", unique_session_id()),
            json!({ "gift_id": Uuid::new_v4(), "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_item_rejects_zero_quantity() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", unique_session_id()),
            json!({ "gift_id": Uuid::new_v4(), "quantity": 0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_remove_item() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(1999, 2), 5).await;

    let session = unique_session_id();
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", session),
            json!({ "gift_id": gift.id, "quantity": 1 }),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let item_id = body["items"][0]["id"].as_str().unwrap().to_string();

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/carts/{}/items/{}", session, item_id),
            json!({ "quantity": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["items"][0]["quantity"], 3);

    let request = axum::http::Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/v1/carts/{}/items/{}", session, item_id))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_update_details_validates_email() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let session = unique_session_id();
    // Create the cart first.
    test.app
        .clone()
        .oneshot(get_request(&format!("/api/v1/carts/{}", session)))
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/carts/{}/details", session),
            json!({ "invitee_name": "Jana", "invitee_email": "not-an-email" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/carts/{}/details", session),
            json!({
                "invitee_name": "Jana",
                "invitee_email": "jana@example.com",
                "message": "Congratulations!"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["invitee_name"], "Jana");
    assert_eq!(body["message"], "Congratulations!");
}

#[tokio::test]
async fn test_paid_cart_rejects_mutations() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(10000, 2), 5).await;

    let session = unique_session_id();
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", session),
            json!({ "gift_id": gift.id, "quantity": 1 }),
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let cart_id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();

    force_cart_paid(&pool, cart_id).await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", session),
            json!({ "gift_id": gift.id, "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/carts/{}/details", session),
            json!({ "invitee_name": "Jana", "invitee_email": "jana@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_checkout_state_transitions() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(5000, 2), 5).await;

    // Unknown session is idle.
    let session = unique_session_id();
    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/carts/{}/checkout-state",
            session
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["state"], "idle");

    // With items the guest is filling in details.
    test.app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/carts/{}/items", session),
            json!({ "gift_id": gift.id, "quantity": 1 }),
        ))
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/carts/{}/checkout-state",
            session
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["state"], "details");

    // Cancel flag wins while unpaid.
    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/carts/{}/checkout-state?cancelled=true",
            session
        )))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["state"], "cancelled");
}
