mod common;

use axum::http::StatusCode;
use common::{bare_request, json_request, order_body, test_app};
use serde_json::json;

#[tokio::test]
async fn test_order_routes_require_authentication() {
    let app = test_app();
    let book = app.book("Dune", "10.00", 5).await;

    let (status, body) = app
        .send(json_request("POST", "/api/orders", None, order_body(&[(book, 1)])))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    for uri in ["/api/orders/user", "/api/orders/admin", "/api/orders/1"] {
        let (status, _) = app.send(bare_request("GET", uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = app
        .send(bare_request("POST", "/api/orders", Some("not.a.jwt")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.stock_of(book).await, 5);
}

#[tokio::test]
async fn test_admin_routes_forbid_customers() {
    let app = test_app();
    let token = app.customer("carol").await;

    let (status, body) = app
        .send(bare_request("GET", "/api/orders/admin", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/orders/1/status",
            Some(&token),
            json!({ "status": "SHIPPED" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_place_order_reserves_stock_and_totals() {
    let app = test_app();
    let token = app.customer("alice").await;
    let book = app.book("Dune", "10.00", 5).await;

    let (status, body) = app
        .send(json_request("POST", "/api/orders", Some(&token), order_body(&[(book, 3)])))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["totalAmount"], 30.0);
    assert_eq!(body["status"], "PENDING");
    assert!(body["orderId"].as_i64().is_some());
    assert_eq!(app.stock_of(book).await, 2);

    let (status, body) = app
        .send(bare_request("GET", "/api/orders/user", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    let order = &body["orders"][0];
    assert_eq!(order["address"], "221B Baker Street");
    assert_eq!(order["orderItems"][0]["title"], "Dune");
    assert_eq!(order["orderItems"][0]["quantity"], 3);
    assert_eq!(order["orderItems"][0]["price"], 10.0);
    assert_eq!(order["orderItems"][0]["book"]["id"], book.into_inner());
    assert_eq!(order["orderItems"][0]["book"]["title"], "Dune");
    assert_eq!(order["orderItems"][0]["book"]["price"], 10.0);
    assert!(order.get("user").is_none());
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let app = test_app();
    let token = app.customer("bob").await;
    let plenty = app.book("Emma", "5.00", 10).await;
    let scarce = app.book("Ulysses", "12.50", 2).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/orders",
            Some(&token),
            order_body(&[(plenty, 4), (scarce, 3)]),
        ))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Insufficient stock for book: Ulysses. Available: 2, Requested: 3"
    );
    assert_eq!(app.stock_of(plenty).await, 10);
    assert_eq!(app.stock_of(scarce).await, 2);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_rejects_empty_unknown_and_non_positive_lines() {
    let app = test_app();
    let token = app.customer("dave").await;
    let book = app.book("Dune", "10.00", 5).await;

    let (status, body) = app
        .send(json_request("POST", "/api/orders", Some(&token), order_body(&[])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order must contain at least one item");

    let (status, _) = app
        .send(json_request(
            "POST",
            "/api/orders",
            Some(&token),
            json!({ "items": [{ "bookId": 999, "quantity": 1 }], "shippingAddress": "x" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(json_request("POST", "/api/orders", Some(&token), order_body(&[(book, 0)])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/orders",
            Some(&token),
            json!({ "items": [{ "bookId": book.into_inner(), "quantity": 1 }], "shippingAddress": " " }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Shipping address is required");

    assert_eq!(app.stock_of(book).await, 5);
    assert_eq!(app.store.order_count().await, 0);
}

#[tokio::test]
async fn test_admin_updates_status_and_lists_everything() {
    let app = test_app();
    let customer = app.customer("erin").await;
    let admin = app.admin("root").await;
    let book = app.book("Dune", "10.00", 5).await;

    let (_, placed) = app
        .send(json_request("POST", "/api/orders", Some(&customer), order_body(&[(book, 1)])))
        .await;
    let order_id = placed["orderId"].as_i64().unwrap();
    let status_uri = format!("/api/orders/{order_id}/status");

    let (status, body) = app
        .send(json_request("PUT", &status_uri, Some(&admin), json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "SHIPPED");
    assert_eq!(body["order"]["user"]["username"], "erin");

    let (status, body) = app
        .send(json_request("PUT", &status_uri, Some(&admin), json!({ "status": "LOST" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid order status. Valid values are: PENDING, SHIPPED, DELIVERED, CANCELLED"
    );

    let (status, body) = app
        .send(json_request("PUT", &status_uri, Some(&admin), json!({ "status": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "status is required");

    let (status, _) = app
        .send(json_request(
            "PUT",
            "/api/orders/4242/status",
            Some(&admin),
            json!({ "status": "SHIPPED" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(bare_request("GET", "/api/orders/admin", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["orders"][0]["user"]["email"], "erin@example.com");
    assert_eq!(body["orders"][0]["status"], "SHIPPED");
}

#[tokio::test]
async fn test_order_visibility_and_cancel() {
    let app = test_app();
    let owner = app.customer("frank").await;
    let stranger = app.customer("grace").await;
    let admin = app.admin("root").await;
    let book = app.book("Dune", "10.00", 5).await;

    let (_, placed) = app
        .send(json_request("POST", "/api/orders", Some(&owner), order_body(&[(book, 2)])))
        .await;
    let order_id = placed["orderId"].as_i64().unwrap();
    let order_uri = format!("/api/orders/{order_id}");

    let (status, _) = app.send(bare_request("GET", &order_uri, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(bare_request("GET", &order_uri, Some(&stranger)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(bare_request("GET", &order_uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["user"]["username"], "frank");

    let cancel_uri = format!("{order_uri}/cancel");
    let (status, _) = app
        .send(bare_request("POST", &cancel_uri, Some(&stranger)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send(bare_request("POST", &cancel_uri, Some(&owner))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "CANCELLED");
    assert_eq!(app.stock_of(book).await, 3);

    let (status, _) = app
        .send(bare_request("GET", "/api/orders/777", Some(&owner)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_order_id_is_bad_request() {
    let app = test_app();
    let customer = app.customer("heidi").await;
    let admin = app.admin("root").await;

    let (status, body) = app
        .send(bare_request("GET", "/api/orders/abc", Some(&customer)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid path parameter");

    let (status, body) = app
        .send(bare_request("POST", "/api/orders/abc/cancel", Some(&customer)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send(json_request(
            "PUT",
            "/api/orders/abc/status",
            Some(&admin),
            json!({ "status": "SHIPPED" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_never_oversell() {
    let app = test_app();
    let book = app.book("Last Copy", "9.99", 3).await;

    let mut tokens = Vec::new();
    for i in 0..12 {
        tokens.push(app.customer(&format!("buyer{i}")).await);
    }

    let mut handles = Vec::new();
    for token in tokens {
        let router = app.router.clone();
        let request = json_request("POST", "/api/orders", Some(&token), order_body(&[(book, 1)]));
        handles.push(tokio::spawn(async move {
            use tower::ServiceExt;
            router.oneshot(request).await.unwrap().status()
        }));
    }

    let mut placed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => placed += 1,
            StatusCode::CONFLICT => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(placed, 3);
    assert_eq!(rejected, 9);
    assert_eq!(app.stock_of(book).await, 0);
    assert_eq!(app.store.order_count().await, 3);
}
