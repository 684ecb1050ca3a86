use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use marketplace_api::{
    config::AppConfig,
    db::{DbPool, create_pool},
    dto::{
        cart::{AddToCartRequest, RemoveFromCartRequest, UpdateCartRequest},
        payment::FinalizeSessionResponse,
        promo::{CreatePromoRequest, ValidatePromoRequest},
    },
    error::AppError,
    gateway::{CheckoutGateway, CheckoutSession, CreateSessionRequest, CustomerDetails,
              GatewayError, SessionMetadata},
    models::PromoKind,
    realtime::Realtime,
    services::{cart_service, notification_service, order_service, payment_service, promo_service},
    state::AppState,
};

/// In-memory stand-in for the payment processor: `create_session` records the
/// session, `retrieve_session` plays it back the way the success-page callback
/// would see it.
#[derive(Default)]
struct FakeGateway {
    sessions: Mutex<HashMap<String, CheckoutSession>>,
}

impl FakeGateway {
    async fn install(&self, session: CheckoutSession) {
        self.sessions
            .lock()
            .await
            .insert(session.id.clone(), session);
    }
}

#[async_trait]
impl CheckoutGateway for FakeGateway {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let session = CheckoutSession {
            id: format!("cs_test_{}", self.sessions.lock().await.len() + 1),
            url: Some("https://checkout.example.com/pay".to_string()),
            status: Some("open".to_string()),
            payment_status: Some("unpaid".to_string()),
            payment_intent: None,
            amount_total: Some(request.unit_amount * i64::from(request.quantity)),
            customer_email: Some(request.customer_email.clone()),
            customer_details: None,
            metadata: request.metadata.clone(),
        };
        self.install(session.clone()).await;
        Ok(session)
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, GatewayError> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .ok_or(GatewayError::Response {
                status: 404,
                message: "no such session".to_string(),
            })
    }
}

// Integration flow: cart mutations keep their invariants, a completed payment
// becomes exactly one order with its two notifications, and promo validation
// quotes against the stored code. Skipped when no database is configured.
#[tokio::test]
async fn cart_checkout_and_notification_flow() -> anyhow::Result<()> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let gateway = Arc::new(FakeGateway::default());
    let state = setup_state(&database_url, gateway.clone()).await?;
    let user_id = Uuid::new_v4();

    // Seed a product to sell.
    let product_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO products (name, price, stock, seller_email, seller_name)
        VALUES ('Test Widget', 2000, 10, 'ada@example.com', 'Ada')
        RETURNING id
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    // Empty cart reads as empty, not as an error.
    assert!(cart_service::get_cart(&state.pool, user_id).await?.is_empty());

    // +2, then -1 leaves one unit in the cart.
    cart_service::add_or_adjust(&state, add(user_id, product_id, 2)).await?;
    cart_service::add_or_adjust(&state, add(user_id, product_id, -1)).await?;
    let lines = cart_service::get_cart(&state.pool, user_id).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 1);
    assert_eq!(lines[0].price, 2000);

    // -1 at quantity 1 removes the row instead of storing zero.
    let resp = cart_service::add_or_adjust(&state, add(user_id, product_id, -1)).await?;
    assert_eq!(resp.message, "Item removed from cart!");
    assert!(cart_service::get_cart(&state.pool, user_id).await?.is_empty());

    // Absolute quantity below 1 is rejected without touching the cart.
    let err = cart_service::set_quantity(
        &state,
        UpdateCartRequest {
            user_id,
            product_id,
            quantity: 0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(cart_service::get_cart(&state.pool, user_id).await?.is_empty());

    cart_service::set_quantity(
        &state,
        UpdateCartRequest {
            user_id,
            product_id,
            quantity: 3,
        },
    )
    .await?;
    let lines = cart_service::get_cart(&state.pool, user_id).await?;
    assert_eq!(lines[0].quantity, 3);

    cart_service::remove(
        &state,
        RemoveFromCartRequest {
            user_id,
            product_id,
        },
    )
    .await?;

    // A completed session becomes exactly one order.
    gateway
        .install(CheckoutSession {
            id: "cs_paid".to_string(),
            url: None,
            status: Some("complete".to_string()),
            payment_status: Some("paid".to_string()),
            payment_intent: Some("pi_123".to_string()),
            amount_total: Some(6000),
            customer_email: Some("buyer@example.com".to_string()),
            customer_details: Some(CustomerDetails {
                name: Some("Bob".to_string()),
            }),
            metadata: SessionMetadata {
                product_id: product_id.to_string(),
                product_name: "Test Widget".to_string(),
                seller_name: "Ada".to_string(),
                seller_email: "ada@example.com".to_string(),
                unit_amount: "2000".to_string(),
                promo_code: None,
            },
        })
        .await;

    let first = payment_service::finalize_session(&state, "cs_paid").await?;
    assert!(matches!(first, FinalizeSessionResponse::Completed { .. }));

    let (order_count, quantity, amount_paid): (i64, i32, i64) = sqlx::query_as(
        "SELECT COUNT(*)::BIGINT, MIN(quantity)::INT, MIN(amount_paid)::BIGINT
         FROM paid_orders WHERE transition_id = 'pi_123'",
    )
    .fetch_one(&state.pool)
    .await?;
    assert_eq!(order_count, 1);
    assert_eq!(quantity, 3);
    assert_eq!(amount_paid, 6000);

    // Buyer and seller each got exactly one notification.
    assert_eq!(
        notification_service::unread_count(&state.pool, "buyer@example.com").await?,
        1
    );
    assert_eq!(
        notification_service::unread_count(&state.pool, "ADA@example.com").await?,
        1
    );

    // Success-page refresh: same session id, no second order, no new notifications.
    let second = payment_service::finalize_session(&state, "cs_paid").await?;
    assert!(matches!(
        second,
        FinalizeSessionResponse::AlreadyProcessed { .. }
    ));
    let (order_count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM paid_orders WHERE transition_id = 'pi_123'")
            .fetch_one(&state.pool)
            .await?;
    assert_eq!(order_count, 1);
    assert_eq!(
        notification_service::unread_count(&state.pool, "buyer@example.com").await?,
        1
    );

    // mark-all-read drains the unread count and repeats as a no-op.
    let modified = notification_service::mark_all_read(&state.pool, "Buyer@Example.com").await?;
    assert_eq!(modified, 1);
    assert_eq!(
        notification_service::unread_count(&state.pool, "buyer@example.com").await?,
        0
    );
    let modified = notification_service::mark_all_read(&state.pool, "buyer@example.com").await?;
    assert_eq!(modified, 0);

    // Dashboards see the order.
    let seller = order_service::seller_stats(&state.pool, "ada@example.com").await?;
    assert_eq!(seller.total_orders, 1);
    assert_eq!(seller.total_revenue, 6000);
    assert_eq!(seller.last7_days.len(), 7);
    assert_eq!(seller.last7_days[6].orders, 1);

    let user = order_service::user_stats(&state.pool, "buyer@example.com").await?;
    assert_eq!(user.total_spent, 6000);
    assert_eq!(user.pending_count, 1);

    // Promo quotes come straight from the stored code.
    promo_service::create(
        &state,
        CreatePromoRequest {
            code: "save10".to_string(),
            kind: PromoKind::Percentage,
            value: 10,
            description: Some("Ten percent off".to_string()),
            min_order: None,
            max_uses: Some(1),
            expires_at: None,
        },
    )
    .await?;

    let quote = promo_service::validate(
        &state.pool,
        ValidatePromoRequest {
            code: "  save10 ".to_string(),
            subtotal: 20_000,
        },
    )
    .await?;
    assert!(quote.valid);
    assert_eq!(quote.discount, Some(2_000));
    assert_eq!(quote.code.as_deref(), Some("SAVE10"));

    // The single increment path deactivates the code at its cap.
    promo_service::increment_usage(&state.pool, "SAVE10").await?;
    let spent = promo_service::validate(
        &state.pool,
        ValidatePromoRequest {
            code: "SAVE10".to_string(),
            subtotal: 20_000,
        },
    )
    .await?;
    assert!(!spent.valid);

    Ok(())
}

fn add(user_id: Uuid, product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        user_id,
        product_id,
        quantity,
    }
}

async fn setup_state(database_url: &str, gateway: Arc<FakeGateway>) -> anyhow::Result<AppState> {
    let pool: DbPool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE cart_items, paid_orders, notifications, promo_codes, favorites, products, users",
    )
    .execute(&pool)
    .await?;

    Ok(AppState {
        pool,
        realtime: Realtime::new(),
        gateway,
        config: AppConfig {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            stripe_secret_key: "sk_test_unused".to_string(),
            site_domain: "http://localhost:3000".to_string(),
        },
    })
}
