//! Integration tests for gift management and the direct purchase path.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    auth_token, create_test_app, create_test_couple, create_test_gift, create_test_list,
    create_test_pool, delete_request_with_auth, get_request, get_request_with_auth,
    json_request_with_auth, parse_response_body, run_migrations,
};
use domain::models::UserRole;
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_gift_requires_auth() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/wedding-lists/{}/gifts", list.id))
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            serde_json::to_string(&json!({ "name": "Vase", "price": "49.99" })).unwrap(),
        ))
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_gifts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/wedding-lists/{}/gifts", list.id),
            json!({ "name": "Espresso machine", "price": "349.00", "quantity": 2 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["name"], "Espresso machine");
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["purchased_quantity"], 0);
    assert_eq!(body["is_purchased"], false);

    let response = test
        .app
        .clone()
        .oneshot(get_request_with_auth(
            &format!("/api/v1/wedding-lists/{}/gifts", list.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_gift_on_foreign_list_is_forbidden() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let owner = create_test_couple(&pool).await;
    let list = create_test_list(&pool, owner.id).await;

    let other = create_test_couple(&pool).await;
    let token = auth_token(&test.config, other.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/wedding-lists/{}/gifts", list.id),
            json!({ "name": "Vase", "price": "49.99" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_gift_validation_rejects_nonpositive_price() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/wedding-lists/{}/gifts", list.id),
            json!({ "name": "Vase", "price": "0" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_gift_cannot_drop_quantity_below_purchased() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(9900, 2), 3).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    // Two units purchased.
    for _ in 0..2 {
        let response = test
            .app
            .clone()
            .oneshot(json_request_with_auth(
                Method::POST,
                &format!("/api/v1/gifts/{}/purchase", gift.id),
                json!({}),
                &token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::PUT,
            &format!("/api/v1/gifts/{}", gift.id),
            json!({ "quantity": 1 }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purchase_until_sold_out() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(12500, 2), 2).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    for expected in 1..=2 {
        let response = test
            .app
            .clone()
            .oneshot(json_request_with_auth(
                Method::POST,
                &format!("/api/v1/gifts/{}/purchase", gift.id),
                json!({ "message": "Congratulations!" }),
                &token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = parse_response_body(response).await;
        assert_eq!(body["purchased_quantity"], expected);
        assert_eq!(body["status"], "PENDING");
    }

    // The third attempt finds every unit gone.
    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/gifts/{}/purchase", gift.id),
            json!({}),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The registry page now shows the gift as purchased.
    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!("/api/v1/registry/{}", list.slug)))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body["gifts"][0]["is_purchased"], true);
}

#[tokio::test]
async fn test_confirm_purchase_is_admin_only() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(5000, 2), 1).await;
    let couple_token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/gifts/{}/purchase", gift.id),
            json!({}),
            &couple_token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    let purchase_id = body["purchase_id"].as_str().unwrap().to_string();

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/purchases/{}/confirm", purchase_id),
            json!({}),
            &couple_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = common::create_test_admin(&pool).await;
    let admin_token = auth_token(&test.config, admin.id, UserRole::Admin);
    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            &format!("/api/v1/purchases/{}/confirm", purchase_id),
            json!({}),
            &admin_token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "CONFIRMED");
}

#[tokio::test]
async fn test_delete_gift() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let gift = create_test_gift(&pool, list.id, Decimal::new(1000, 2), 1).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/v1/gifts/{}", gift.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test
        .app
        .clone()
        .oneshot(get_request_with_auth(
            &format!("/api/v1/wedding-lists/{}/gifts", list.id),
            &token,
        ))
        .await
        .unwrap();
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
