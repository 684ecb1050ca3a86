use crate::{
    dto::{
        notifications::CreateNotificationRequest,
        payment::{
            CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, FinalizeSessionResponse,
        },
    },
    error::{AppError, AppResult},
    gateway::{CreateSessionRequest, SessionMetadata},
    models::{NotificationType, OrderStatus, normalize_code},
    services::{notification_service, promo_service},
    state::AppState,
};

/// Open an externally-hosted checkout session for a single cart line and hand
/// back the redirect URL. Everything the finalize callback will need travels
/// as session metadata; the processor returns only a session reference.
pub async fn create_checkout_session(
    state: &AppState,
    payload: CreateCheckoutSessionRequest,
) -> AppResult<CreateCheckoutSessionResponse> {
    if payload.price < 1 {
        return Err(AppError::BadRequest(
            "price must be at least 1".to_string(),
        ));
    }
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let metadata = SessionMetadata {
        product_id: payload.product_id,
        product_name: payload.product_name.clone(),
        seller_name: payload.seller_name,
        seller_email: payload.seller_email,
        unit_amount: payload.price.to_string(),
        promo_code: payload
            .promo_code
            .map(|c| normalize_code(&c))
            .filter(|c| !c.is_empty()),
    };

    let request = CreateSessionRequest {
        unit_amount: payload.price,
        quantity: payload.quantity,
        product_name: payload.product_name,
        customer_email: payload.user_email,
        metadata,
        success_url: format!(
            "{}/payment-success?session_id={{CHECKOUT_SESSION_ID}}",
            state.config.site_domain
        ),
        cancel_url: format!("{}/payment-cancel", state.config.site_domain),
    };

    let session = state.gateway.create_session(&request).await?;
    let url = session.url.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("checkout session has no redirect url"))
    })?;

    Ok(CreateCheckoutSessionResponse { url })
}

/// Convert a completed checkout session into a durable order record, exactly
/// once per payment intent.
///
/// Success-page loads, refreshes, and processor retries all hit this path for
/// the same session, so the order insert is a single insert-if-absent on the
/// payment-intent id; a retry observes zero inserted rows and returns success
/// without writing or notifying again.
pub async fn finalize_session(
    state: &AppState,
    session_id: &str,
) -> AppResult<FinalizeSessionResponse> {
    let session = state.gateway.retrieve_session(session_id).await?;

    let transition_id = session.payment_intent.ok_or_else(|| {
        AppError::BadRequest("session has no payment intent; payment not completed".to_string())
    })?;

    let metadata = session.metadata;
    let amount_paid = session.amount_total.unwrap_or(0);
    let quantity = derive_quantity(amount_paid, metadata.unit_amount());
    let customer_email = session.customer_email.clone().unwrap_or_default();
    let customer_name = session
        .customer_details
        .and_then(|d| d.name)
        .unwrap_or_default();
    let payment_status = session
        .payment_status
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let inserted = sqlx::query(
        r#"
        INSERT INTO paid_orders
            (transition_id, customer_email, customer_name, product_id, product_name,
             seller_email, seller_name, quantity, amount_paid, payment_status, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (transition_id) DO NOTHING
        "#,
    )
    .bind(&transition_id)
    .bind(&customer_email)
    .bind(&customer_name)
    .bind(&metadata.product_id)
    .bind(&metadata.product_name)
    .bind(&metadata.seller_email)
    .bind(&metadata.seller_name)
    .bind(quantity)
    .bind(amount_paid)
    .bind(&payment_status)
    .bind(OrderStatus::New.as_str())
    .execute(&state.pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(FinalizeSessionResponse::AlreadyProcessed {
            message: "Order already processed.".to_string(),
        });
    }

    // Everything past the order write is best-effort: the payment is durable
    // even when a notification or the promo counter fails.
    if let Some(code) = &metadata.promo_code
        && let Err(err) = promo_service::increment_usage(&state.pool, code).await
    {
        tracing::warn!(error = %err, code = %code, "promo usage increment failed");
    }

    if !customer_email.is_empty() {
        let result = notification_service::create(
            state,
            CreateNotificationRequest {
                email: customer_email.clone(),
                kind: NotificationType::PaymentSuccess,
                title: "Order Confirmed!".to_string(),
                message: Some(format!(
                    "Payment successful for {}. Amount: ${}",
                    metadata.product_name,
                    promo_service::format_amount(amount_paid)
                )),
                meta: None,
            },
        )
        .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, "customer notification failed");
        }
    }

    if !metadata.seller_email.is_empty() {
        let buyer = if customer_name.is_empty() {
            "a customer".to_string()
        } else {
            customer_name.clone()
        };
        let result = notification_service::create(
            state,
            CreateNotificationRequest {
                email: metadata.seller_email.clone(),
                kind: NotificationType::OrderConfirmed,
                title: "New Order Received!".to_string(),
                message: Some(format!(
                    "Start packing! You sold {} to {}.",
                    metadata.product_name, buyer
                )),
                meta: None,
            },
        )
        .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, "seller notification failed");
        }
    }

    Ok(FinalizeSessionResponse::Completed {
        status: session.status,
        payment_status: session.payment_status,
        metadata,
        customer_email: session.customer_email,
    })
}

/// Units bought, recovered from the session total and the unit price carried
/// in metadata. Falls back to 1 when the total is not an exact multiple.
fn derive_quantity(amount_total: i64, unit_amount: Option<i64>) -> i32 {
    match unit_amount {
        Some(unit) if unit > 0 && amount_total > 0 && amount_total % unit == 0 => {
            i32::try_from(amount_total / unit).unwrap_or(1)
        }
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_is_total_over_unit_price() {
        assert_eq!(derive_quantity(6_000, Some(2_000)), 3);
        assert_eq!(derive_quantity(2_000, Some(2_000)), 1);
    }

    #[test]
    fn undivisible_totals_default_to_one() {
        assert_eq!(derive_quantity(5_000, Some(2_000)), 1);
        assert_eq!(derive_quantity(5_000, None), 1);
        assert_eq!(derive_quantity(0, Some(2_000)), 1);
        assert_eq!(derive_quantity(5_000, Some(0)), 1);
    }
}
