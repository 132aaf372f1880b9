use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use tower::ServiceExt;

use offerflow::{
    api::{self, state::AppState},
    domain::OrderStatus,
    error::Result,
    payments::{GatewayRegistry, PaymentGateway, PaymentLink, PaymentLinkRequest},
    repository::{
        OrderRepository, SqliteGroupRepository, SqliteOfferRepository, SqliteOrderRepository,
        SqliteUserRepository,
    },
    service::{CheckoutService, NoopMailer, ProcessOfferRequest},
};

/// Gateway double: answers with a fixed payment id, no network.
struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn payment_link(&self, req: &PaymentLinkRequest) -> Result<PaymentLink> {
        Ok(PaymentLink {
            payment_url: format!("https://pay.example/session/{}", req.order_id),
            payment_id: "421001".to_string(),
            order_id: req.order_id,
        })
    }
}

struct TestApp {
    pool: SqlitePool,
    router: Router,
    checkout: Arc<CheckoutService>,
    orders: Arc<SqliteOrderRepository>,
}

async fn setup() -> anyhow::Result<TestApp> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    sqlx::query("INSERT INTO groups (id, name) VALUES (1, 'Course Students')")
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO offers (id, name, slug, price, currency, is_free)
         VALUES (10, 'Video Course', 'course', 2500, 'RUB', 0)",
    )
    .execute(&pool)
    .await?;
    sqlx::query("INSERT INTO offer_groups (offer_id, group_id) VALUES (10, 1)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO pay_integrations (id, name, type, login, password)
         VALUES (5, 'card', 'tinkoff', 'terminal-key', 'terminal-secret')",
    )
    .execute(&pool)
    .await?;

    let orders = Arc::new(SqliteOrderRepository::new(pool.clone()));
    let offers = Arc::new(SqliteOfferRepository::new(pool.clone()));
    let groups = Arc::new(SqliteGroupRepository::new(pool.clone()));
    let users = Arc::new(SqliteUserRepository::new(pool.clone()));

    let gateway: Arc<dyn PaymentGateway> = Arc::new(FakeGateway);
    let checkout = Arc::new(CheckoutService::new(
        orders.clone(),
        offers.clone(),
        groups,
        users,
        GatewayRegistry::new(gateway.clone(), gateway),
        Arc::new(NoopMailer),
    ));

    let router = api::create_app(AppState::new(checkout.clone(), offers));

    Ok(TestApp {
        pool,
        router,
        checkout,
        orders,
    })
}

/// Places one paid order (id 1, price 2500, payment id "421001").
async fn place_order(app: &TestApp) -> anyhow::Result<()> {
    app.checkout
        .process_offer(
            "course",
            ProcessOfferRequest {
                selected_pay_method: Some("card".to_string()),
                first_name: Some("Anna".to_string()),
                last_name: None,
                email: "anna@example.com".to_string(),
                phone: None,
                telegram: None,
                instagram: None,
                comment: None,
            },
        )
        .await?;
    Ok(())
}

fn post_json(uri: &str, body: serde_json::Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

fn tinkoff_body(order_id: &str, amount: i64) -> serde_json::Value {
    json!({
        "OrderId": order_id,
        "Status": "CONFIRMED",
        "PaymentId": 421001,
        "Amount": amount,
        "ErrorCode": "0",
        "Pan": "430000******0777",
        "ExpDate": "1122"
    })
}

#[tokio::test]
async fn test_tinkoff_webhook_confirms_order_via_endpoint() -> anyhow::Result<()> {
    let app = setup().await?;
    place_order(&app).await?;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/webhooks/tinkoff", tinkoff_body("1", 2500))?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"OK");

    let order = app.orders.find_by_id(1).await?.expect("order exists");
    assert_eq!(order.status, OrderStatus::Succeeded);

    Ok(())
}

#[tokio::test]
async fn test_rejected_webhook_is_acknowledged_without_touching_the_order() -> anyhow::Result<()> {
    let app = setup().await?;
    place_order(&app).await?;

    // Amount disagrees with the stored order; the provider must not retry
    let response = app
        .router
        .clone()
        .oneshot(post_json("/webhooks/tinkoff", tinkoff_body("1", 100))?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    assert_eq!(&body[..], b"OK");

    let order = app.orders.find_by_id(1).await?.expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.card_pan.is_none());

    Ok(())
}

#[tokio::test]
async fn test_webhook_internal_failure_returns_500() -> anyhow::Result<()> {
    let app = setup().await?;
    place_order(&app).await?;

    // A closed pool turns every order lookup into a database error, which
    // is the one case the provider should retry
    app.pool.close().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/webhooks/tinkoff", tinkoff_body("1", 2500))?)
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

#[tokio::test]
async fn test_prodamus_webhook_with_unparsable_sum_is_acknowledged() -> anyhow::Result<()> {
    let app = setup().await?;
    place_order(&app).await?;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/webhooks/prodamus",
            json!({
                "order_id": "1",
                "payment_id": "421001",
                "sum": "2 500,00",
                "payment_status": "success"
            }),
        )?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let order = app.orders.find_by_id(1).await?.expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);

    Ok(())
}
