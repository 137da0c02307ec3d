//! Integration tests for wedding list management and the public registry.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    auth_token, create_test_app, create_test_couple, create_test_gift, create_test_list,
    create_test_pool, delete_request_with_auth, get_request, get_request_with_auth,
    json_request_with_auth, parse_response_body, run_migrations, unique_slug,
};
use domain::models::UserRole;
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_wedding_list() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);
    let slug = unique_slug();

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/wedding-lists",
            json!({ "title": "Anna & Tom", "slug": slug, "event_date": "2027-06-12" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["title"], "Anna & Tom");
    assert_eq!(body["slug"], slug);
    assert_eq!(body["couple_id"], couple.id.to_string());
}

#[tokio::test]
async fn test_duplicate_slug_gets_numeric_suffix() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);
    let slug = unique_slug();

    for expected in [slug.clone(), format!("{}-1", slug)] {
        let response = test
            .app
            .clone()
            .oneshot(json_request_with_auth(
                Method::POST,
                "/api/v1/wedding-lists",
                json!({ "title": "Anna & Tom", "slug": slug }),
                &token,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = parse_response_body(response).await;
        assert_eq!(body["slug"], expected);
    }
}

#[tokio::test]
async fn test_invalid_slug_is_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(json_request_with_auth(
            Method::POST,
            "/api/v1/wedding-lists",
            json!({ "title": "Anna & Tom", "slug": "Not A Slug" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_only_own_wedding_lists() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    create_test_list(&pool, couple.id).await;
    create_test_list(&pool, couple.id).await;

    let other = create_test_couple(&pool).await;
    create_test_list(&pool, other.id).await;

    let token = auth_token(&test.config, couple.id, UserRole::Couple);
    let response = test
        .app
        .clone()
        .oneshot(get_request_with_auth("/api/v1/wedding-lists", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_foreign_list_access_is_forbidden() {
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
        .oneshot(get_request_with_auth(
            &format!("/api/v1/wedding-lists/{}", list.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = test
        .app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/v1/wedding-lists/{}", list.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_wedding_list() {
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
            Method::PUT,
            &format!("/api/v1/wedding-lists/{}", list.id),
            json!({ "title": "New Title", "description": "Updated" }),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["title"], "New Title");
    assert_eq!(body["description"], "Updated");
    // Slug is immutable.
    assert_eq!(body["slug"], list.slug);
}

#[tokio::test]
async fn test_public_registry_needs_no_auth() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    create_test_gift(&pool, list.id, Decimal::new(7500, 2), 1).await;

    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!("/api/v1/registry/{}", list.slug)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["slug"], list.slug);
    let gifts = body["gifts"].as_array().unwrap();
    assert_eq!(gifts.len(), 1);
    assert_eq!(gifts[0]["price"], "75.00");
    // Couple id is not exposed on the public page.
    assert!(body.get("couple_id").is_none());
}

#[tokio::test]
async fn test_unknown_registry_slug_is_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let response = test
        .app
        .clone()
        .oneshot(get_request("/api/v1/registry/no-such-registry"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_wedding_list_removes_it() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let test = create_test_app(pool.clone());

    let couple = create_test_couple(&pool).await;
    let list = create_test_list(&pool, couple.id).await;
    let token = auth_token(&test.config, couple.id, UserRole::Couple);

    let response = test
        .app
        .clone()
        .oneshot(delete_request_with_auth(
            &format!("/api/v1/wedding-lists/{}", list.id),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = test
        .app
        .clone()
        .oneshot(get_request(&format!("/api/v1/registry/{}", list.slug)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
