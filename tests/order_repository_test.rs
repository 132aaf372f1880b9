use offerflow::{
    domain::{NewOrder, OrderCardInfo, OrderError, OrderStatus},
    repository::{OrderRepository, SqliteOrderRepository},
};
use sqlx::SqlitePool;

async fn setup_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePool::connect(":memory:").await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    // Minimal fixtures an order row depends on
    sqlx::query("INSERT INTO users (id, email, first_name) VALUES (1, 'buyer@example.com', 'Buyer')")
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO offers (id, name, slug, price, currency) VALUES (10, 'Course', 'course', 2500, 'RUB')",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO pay_integrations (id, name, type, login, password) VALUES (5, 'card', 'tinkoff', 'login', 'secret')",
    )
    .execute(&pool)
    .await?;

    Ok(pool)
}

fn new_order() -> NewOrder {
    NewOrder {
        description: Some("Course".to_string()),
        price: 2500,
        currency: "RUB".to_string(),
        integration_id: 5,
        offer_id: 10,
        project_id: 1,
        user_id: 1,
    }
}

#[tokio::test]
async fn test_order_lifecycle() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteOrderRepository::new(pool.clone());

    // Create
    let order_id = repo.create(new_order()).await?;
    let order = repo.find_by_id(order_id).await?.expect("order exists");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.price, 2500);
    assert!(order.payment_id.is_none());

    // Attach the provider payment id
    repo.set_payment_id(order_id, "421001").await?;
    let order = repo.find_by_id(order_id).await?.expect("order exists");
    assert_eq!(order.payment_id.as_deref(), Some("421001"));

    // The join view used by webhook handling
    let processing = repo.find_for_processing(order_id).await?.expect("order exists");
    assert_eq!(processing.offer_slug, "course");
    assert_eq!(processing.user_email, "buyer@example.com");
    assert_eq!(processing.payment_id.as_deref(), Some("421001"));

    // Status transition with audit metadata
    let error = OrderError {
        status_code: "0".to_string(),
        message: String::new(),
        details: String::new(),
    };
    let card = OrderCardInfo {
        pan: "430000******0777".to_string(),
        expiry: "1122".to_string(),
    };
    repo.update_status(order_id, OrderStatus::Succeeded, &error, &card)
        .await?;

    let order = repo.find_by_id(order_id).await?.expect("order exists");
    assert_eq!(order.status, OrderStatus::Succeeded);
    assert_eq!(order.card_pan.as_deref(), Some("430000******0777"));
    assert_eq!(order.error_code.as_deref(), Some("0"));

    Ok(())
}

#[tokio::test]
async fn test_payment_id_is_write_once() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteOrderRepository::new(pool.clone());

    let order_id = repo.create(new_order()).await?;
    repo.set_payment_id(order_id, "first").await?;

    let second = repo.set_payment_id(order_id, "second").await;
    assert!(second.is_err());

    let order = repo.find_by_id(order_id).await?.expect("order exists");
    assert_eq!(order.payment_id.as_deref(), Some("first"));

    Ok(())
}

#[tokio::test]
async fn test_find_missing_order() -> anyhow::Result<()> {
    let pool = setup_pool().await?;
    let repo = SqliteOrderRepository::new(pool);

    assert!(repo.find_by_id(9999).await?.is_none());
    assert!(repo.find_for_processing(9999).await?.is_none());

    Ok(())
}
