use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::notifications::CreateNotificationRequest,
    error::{AppError, AppResult},
    models::Notification,
    realtime::RealtimeEvent,
    state::AppState,
};

/// Persist a notification, then push it to the recipient's channel if one is
/// live. The push is a convenience, not a durability guarantee; only the
/// insert can fail the call.
pub async fn create(
    state: &AppState,
    payload: CreateNotificationRequest,
) -> AppResult<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (email, kind, title, message, meta)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&payload.email)
    .bind(payload.kind.as_str())
    .bind(&payload.title)
    .bind(payload.message.unwrap_or_default())
    .bind(payload.meta.unwrap_or_else(|| serde_json::json!({})))
    .fetch_one(&state.pool)
    .await?;

    match serde_json::to_value(&notification) {
        Ok(value) => {
            state
                .realtime
                .emit_to(&notification.email, RealtimeEvent::Notification(value))
                .await;
        }
        Err(err) => {
            tracing::warn!(error = %err, "notification push skipped");
        }
    }

    Ok(notification)
}

/// Up to 50 most-recent notifications, matched case-insensitively.
pub async fn list(pool: &DbPool, email: &str) -> AppResult<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE lower(email) = lower($1)
        ORDER BY created_at DESC
        LIMIT 50
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn unread_count(pool: &DbPool, email: &str) -> AppResult<i64> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notifications WHERE lower(email) = lower($1) AND read = false",
    )
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(count.0)
}

pub async fn mark_read(pool: &DbPool, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("UPDATE notifications SET read = true WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Bulk read-state transition scoped to unread rows only, which makes a
/// repeated call a no-op.
pub async fn mark_all_read(pool: &DbPool, email: &str) -> AppResult<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET read = true WHERE lower(email) = lower($1) AND read = false",
    )
    .bind(email)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn remove(pool: &DbPool, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Fire-and-forget coupon announcement to every connected client. Nothing is
/// persisted per recipient.
pub fn broadcast_coupon(state: &AppState, code: &str, discount: i64) {
    state.realtime.broadcast(RealtimeEvent::Coupon {
        code: code.to_string(),
        discount,
    });
}
