use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{DailySales, OrderListQuery, PlatformStats, SellerStats, UserStats},
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
};

pub async fn list_orders(pool: &DbPool, query: OrderListQuery) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        SELECT * FROM paid_orders
        WHERE ($1::TEXT IS NULL OR seller_email = $1)
          AND ($2::TEXT IS NULL OR customer_email = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(query.seller_email)
    .bind(query.customer_email)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// Lifecycle transition on an order; the only mutation orders accept after
/// creation.
pub async fn update_status(pool: &DbPool, id: Uuid, status: OrderStatus) -> AppResult<Order> {
    let order = sqlx::query_as::<_, Order>(
        "UPDATE paid_orders SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;

    match order {
        Some(order) => Ok(order),
        None => Err(AppError::NotFound),
    }
}

pub async fn seller_stats(pool: &DbPool, seller_email: &str) -> AppResult<SellerStats> {
    let (total_products,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products WHERE seller_email = $1")
            .bind(seller_email)
            .fetch_one(pool)
            .await?;

    let (total_orders, total_revenue): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(amount_paid), 0)::BIGINT FROM paid_orders WHERE seller_email = $1",
    )
    .bind(seller_email)
    .fetch_one(pool)
    .await?;

    let status_counts = status_counts(
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM paid_orders WHERE seller_email = $1 GROUP BY status",
        )
        .bind(seller_email)
        .fetch_all(pool)
        .await?,
    );

    let window_start = week_window_start();
    let rows = sqlx::query_as::<_, DayRow>(
        r#"
        SELECT date_trunc('day', created_at) AS day,
               COUNT(*) AS orders,
               COALESCE(SUM(amount_paid), 0)::BIGINT AS revenue
        FROM paid_orders
        WHERE seller_email = $1 AND created_at >= $2
        GROUP BY day
        "#,
    )
    .bind(seller_email)
    .bind(window_start)
    .fetch_all(pool)
    .await?;

    Ok(SellerStats {
        total_products,
        total_orders,
        total_revenue,
        status_counts,
        last7_days: zero_filled_week(rows),
    })
}

pub async fn user_stats(pool: &DbPool, customer_email: &str) -> AppResult<UserStats> {
    let (total_orders, total_spent): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(amount_paid), 0)::BIGINT FROM paid_orders WHERE customer_email = $1",
    )
    .bind(customer_email)
    .fetch_one(pool)
    .await?;

    let status_counts = status_counts(
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM paid_orders WHERE customer_email = $1 GROUP BY status",
        )
        .bind(customer_email)
        .fetch_all(pool)
        .await?,
    );

    let pending_count = [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ]
    .iter()
    .map(|s| status_counts.get(s.as_str()).copied().unwrap_or(0))
    .sum();
    let delivered_count = status_counts
        .get(OrderStatus::Delivered.as_str())
        .copied()
        .unwrap_or(0);

    let (wishlist_count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM favorites f
        JOIN users u ON u.id = f.user_id
        WHERE lower(u.email) = lower($1)
        "#,
    )
    .bind(customer_email)
    .fetch_one(pool)
    .await?;

    Ok(UserStats {
        total_orders,
        total_spent,
        pending_count,
        delivered_count,
        wishlist_count,
        status_counts,
    })
}

pub async fn platform_stats(pool: &DbPool) -> AppResult<PlatformStats> {
    let (total_orders, total_revenue): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(amount_paid), 0)::BIGINT FROM paid_orders",
    )
    .fetch_one(pool)
    .await?;

    let status_counts = status_counts(
        sqlx::query_as("SELECT status, COUNT(*) FROM paid_orders GROUP BY status")
            .fetch_all(pool)
            .await?,
    );

    let (total_users,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let (total_sellers,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'seller'")
            .fetch_one(pool)
            .await?;
    let (pending_seller_requests,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE seller_request = 'pending'")
            .fetch_one(pool)
            .await?;
    let (total_products,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;

    let (today_order_count, today_sales): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COALESCE(SUM(amount_paid), 0)::BIGINT
        FROM paid_orders
        WHERE created_at >= date_trunc('day', now())
        "#,
    )
    .fetch_one(pool)
    .await?;

    let (new_users_today,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM users WHERE created_at >= date_trunc('day', now())")
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, DayRow>(
        r#"
        SELECT date_trunc('day', created_at) AS day,
               COUNT(*) AS orders,
               COALESCE(SUM(amount_paid), 0)::BIGINT AS revenue
        FROM paid_orders
        WHERE created_at >= $1
        GROUP BY day
        "#,
    )
    .bind(week_window_start())
    .fetch_all(pool)
    .await?;

    let recent_orders =
        sqlx::query_as::<_, Order>("SELECT * FROM paid_orders ORDER BY created_at DESC LIMIT 10")
            .fetch_all(pool)
            .await?;

    Ok(PlatformStats {
        total_orders,
        total_revenue,
        total_users,
        total_sellers,
        total_products,
        pending_seller_requests,
        today_sales,
        today_order_count,
        new_users_today,
        status_counts,
        last7_days: zero_filled_week(rows),
        recent_orders,
    })
}

#[derive(Debug, FromRow)]
struct DayRow {
    day: DateTime<Utc>,
    orders: i64,
    revenue: i64,
}

fn status_counts(rows: Vec<(String, i64)>) -> BTreeMap<String, i64> {
    rows.into_iter().collect()
}

fn week_window_start() -> DateTime<Utc> {
    let start = (Utc::now().date_naive() - Duration::days(6)).and_time(NaiveTime::MIN);
    start.and_utc()
}

/// Seven calendar days ending today, zero-filled where no orders landed.
fn zero_filled_week(rows: Vec<DayRow>) -> Vec<DailySales> {
    let by_day: BTreeMap<_, _> = rows
        .into_iter()
        .map(|r| (r.day.date_naive(), (r.orders, r.revenue)))
        .collect();

    let today = Utc::now().date_naive();
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let (orders, revenue) = by_day.get(&date).copied().unwrap_or((0, 0));
            DailySales {
                date: date.format("%Y-%m-%d").to_string(),
                day: date.format("%a").to_string(),
                orders,
                revenue,
            }
        })
        .collect()
}
