//! HTTP 层集成测试 (oneshot 直接打路由，不起监听)
//!
//! 覆盖认证中间件的公开/受保护路由表、错误码封套和
//! 几条端到端的 API 流程。

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use market_server::{Config, Server, ServerState};

fn test_config() -> Config {
    Config {
        work_dir: "/tmp/market-test".to_string(),
        http_port: 0,
        jwt: market_server::auth::JwtConfig {
            secret: "integration-test-secret-key-of-sufficient-length".to_string(),
            expiration_minutes: 60,
            issuer: "market-identity".to_string(),
            audience: "market-server".to_string(),
        },
        environment: "development".to_string(),
        total_tolerance_cents: 1,
    }
}

async fn test_app() -> (ServerState, Router) {
    let state = ServerState::initialize_in_memory(&test_config()).await;
    let router = Server::build_router(state.clone());
    (state, router)
}

fn token(state: &ServerState, id: &str, role: &str) -> String {
    state
        .get_jwt_service()
        .generate_token(id, id, role)
        .expect("token")
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn request_json(method: &str, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let (_state, app) = test_app().await;
    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn protected_routes_reject_missing_token() {
    let (_state, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/orders", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3001");

    let response = app
        .oneshot(request_json("POST", "/api/orders", None, json!({ "items": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_listings_work_without_token() {
    let (_state, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/urgent-sales", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0000");
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
    // 匿名访问拿到全局营收块 (此时为零)
    assert_eq!(body["data"]["revenue"]["total_revenue"], 0.0);
    assert_eq!(body["data"]["revenue"]["transaction_count"], 0);

    let response = app.oneshot(get("/api/products", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_token_is_rejected_even_on_public_routes() {
    let (_state, app) = test_app().await;
    let response = app
        .oneshot(get("/api/urgent-sales", Some("not-a-real-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E3002");
}

#[tokio::test]
async fn emergency_order_accepts_anonymous_callers() {
    let (state, app) = test_app().await;
    let seller = token(&state, "seller-1", "seller");

    // 卖家先建品
    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/products",
            Some(&seller),
            json!({ "name": "bottled water", "price": 1.5, "stock": 20 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let product_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // 无令牌应急下单
    let response = app
        .oneshot(request_json(
            "POST",
            "/api/orders/emergency",
            None,
            json!({ "items": [{ "product": product_id, "quantity": 2 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["data"]["order_number"].as_str().unwrap().starts_with("EMG-"));
    assert_eq!(body["data"]["buyer"], "anonymous");
    assert_eq!(body["data"]["total_amount"], 3.0);
}

#[tokio::test]
async fn urgent_sale_flow_create_view_sell() {
    let (state, app) = test_app().await;
    let seller = token(&state, "seller-2", "seller");

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/urgent-sales",
            Some(&seller),
            json!({
                "name": "day-old bread",
                "price": 6.0,
                "discounted_price": 2.0,
                "quantity": 8,
                "expires_at": "2030-01-01T00:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let item_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // 匿名详情访问会累加浏览数
    let detail_uri = format!("/api/urgent-sales/{item_id}");
    app.clone().oneshot(get(&detail_uri, None)).await.unwrap();
    let response = app.clone().oneshot(get(&detail_uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["views"], 1);

    // 买家不能标记售出
    let buyer = token(&state, "buyer-1", "buyer");
    let sell_uri = format!("/api/urgent-sales/{item_id}/sell");
    let response = app
        .clone()
        .oneshot(request_json("POST", &sell_uri, Some(&buyer), json!({ "quantity": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 卖家本人可以
    let response = app
        .clone()
        .oneshot(request_json("POST", &sell_uri, Some(&seller), json!({ "quantity": 3 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["amount"], 6.0);

    // 登录卖家的公开列表带本人营收块
    let response = app
        .clone()
        .oneshot(get("/api/urgent-sales", Some(&seller)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["revenue"]["total_revenue"], 6.0);
    assert_eq!(body["data"]["revenue"]["units_sold"], 3);

    // 匿名访问同样拿到 (全局) 营收块
    let response = app
        .oneshot(get("/api/urgent-sales", None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["revenue"]["total_revenue"], 6.0);
}

#[tokio::test]
async fn order_listing_is_scoped_by_role() {
    let (state, app) = test_app().await;
    let seller = token(&state, "seller-1", "seller");
    let buyer = token(&state, "buyer-1", "buyer");
    let other_buyer = token(&state, "buyer-2", "buyer");

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/products",
            Some(&seller),
            json!({ "name": "soup", "price": 4.0, "stock": 10 }),
        ))
        .await
        .unwrap();
    let product_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/orders/simple",
            Some(&buyer),
            json!({ "items": [{ "product": product_id, "quantity": 1 }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // 下单买家看得到，其他买家看不到
    let response = app.clone().oneshot(get("/api/orders", Some(&buyer))).await.unwrap();
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
    let response = app
        .clone()
        .oneshot(get("/api/orders", Some(&other_buyer)))
        .await
        .unwrap();
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    // 详情对无关用户是 403
    let detail_uri = format!("/api/orders/{order_id}");
    let response = app
        .clone()
        .oneshot(get(&detail_uri, Some(&other_buyer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 卖家改状态走状态机
    let status_uri = format!("/api/orders/{order_id}/status");
    let response = app
        .clone()
        .oneshot(request_json(
            "PATCH",
            &status_uri,
            Some(&seller),
            json!({ "status": "processing" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 非法跳跃拿到点名两个状态的 400
    let response = app
        .oneshot(request_json(
            "PATCH",
            &status_uri,
            Some(&seller),
            json!({ "status": "delivered" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "E0005");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("processing") && message.contains("delivered"));
}

#[tokio::test]
async fn seller_stats_exclude_cancelled_orders() {
    let (state, app) = test_app().await;
    let seller = token(&state, "seller-1", "seller");
    let buyer = token(&state, "buyer-1", "buyer");

    let response = app
        .clone()
        .oneshot(request_json(
            "POST",
            "/api/products",
            Some(&seller),
            json!({ "name": "stew", "price": 10.0, "stock": 20 }),
        ))
        .await
        .unwrap();
    let product_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let mut order_ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request_json(
                "POST",
                "/api/orders/simple",
                Some(&buyer),
                json!({ "items": [{ "product": product_id, "quantity": 1 }] }),
            ))
            .await
            .unwrap();
        order_ids.push(
            body_json(response).await["data"]["id"]
                .as_str()
                .unwrap()
                .to_string(),
        );
    }

    // 取消其中一单
    let response = app
        .clone()
        .oneshot(request_json(
            "PATCH",
            &format!("/api/orders/{}/status", order_ids[0]),
            Some(&seller),
            json!({ "status": "cancelled", "note": "out of stock" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/orders/stats", Some(&seller)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["order_count"], 1);
    assert_eq!(body["data"]["revenue"], 10.0);
    assert_eq!(body["data"]["avg_order_value"], 10.0);
}
