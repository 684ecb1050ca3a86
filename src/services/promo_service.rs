use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::promo::{
        CreatePromoRequest, UpdatePromoRequest, ValidatePromoRequest, ValidatePromoResponse,
    },
    error::{AppError, AppResult},
    models::{PromoCode, PromoKind, normalize_code},
    services::notification_service,
    state::AppState,
};

/// Discount in minor units. Percentage rounds half-up to the nearest minor
/// unit; a fixed discount never exceeds the subtotal.
pub fn compute_discount(kind: PromoKind, value: i64, subtotal: i64) -> i64 {
    match kind {
        PromoKind::Percentage => (subtotal * value + 50) / 100,
        PromoKind::Fixed => value.min(subtotal),
    }
}

/// Rejection ladder, first failure wins: inactive, expired, usage limit,
/// minimum order. A code that is both expired and over its limit reports
/// expiry. (Not-found is handled by the caller, before the ladder.)
pub fn evaluate(promo: &PromoCode, subtotal: i64, now: DateTime<Utc>) -> Result<i64, String> {
    if !promo.is_active {
        return Err("This promo code is no longer active.".to_string());
    }
    if let Some(expires_at) = promo.expires_at
        && now > expires_at
    {
        return Err("This promo code has expired.".to_string());
    }
    if let Some(max_uses) = promo.max_uses
        && promo.used_count >= max_uses
    {
        return Err("This promo code has reached its usage limit.".to_string());
    }
    if let Some(min_order) = promo.min_order
        && subtotal < min_order
    {
        return Err(format!(
            "A minimum order of ${} is required for this code.",
            format_amount(min_order)
        ));
    }

    let kind = promo
        .kind
        .parse::<PromoKind>()
        .map_err(|_| "Invalid promo code.".to_string())?;
    Ok(compute_discount(kind, promo.value, subtotal))
}

/// Render minor units as a major-unit amount for human-facing text.
pub fn format_amount(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, (minor % 100).abs())
}

pub async fn validate(
    pool: &DbPool,
    payload: ValidatePromoRequest,
) -> AppResult<ValidatePromoResponse> {
    let code = normalize_code(&payload.code);

    let promo = sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes WHERE code = $1")
        .bind(&code)
        .fetch_optional(pool)
        .await?;

    let Some(promo) = promo else {
        return Ok(ValidatePromoResponse::rejected("Invalid promo code."));
    };

    match evaluate(&promo, payload.subtotal, Utc::now()) {
        Ok(discount) => Ok(ValidatePromoResponse::accepted(
            discount,
            promo.description,
            promo.code,
        )),
        Err(reason) => Ok(ValidatePromoResponse::rejected(reason)),
    }
}

/// Single increment path, invoked only once a payment is confirmed so
/// abandoned checkouts never consume a use. Auto-deactivates at the cap.
pub async fn increment_usage(pool: &DbPool, code: &str) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE promo_codes
        SET used_count = used_count + 1,
            is_active = CASE
                WHEN max_uses IS NOT NULL AND used_count + 1 >= max_uses THEN false
                ELSE is_active
            END
        WHERE code = $1
        "#,
    )
    .bind(normalize_code(code))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn list_all(pool: &DbPool) -> AppResult<Vec<PromoCode>> {
    let promos =
        sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
    Ok(promos)
}

pub async fn create(state: &AppState, payload: CreatePromoRequest) -> AppResult<PromoCode> {
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code is required".to_string()));
    }
    if payload.value <= 0 {
        return Err(AppError::BadRequest(
            "value must be greater than 0".to_string(),
        ));
    }
    if payload.kind == PromoKind::Percentage && payload.value > 100 {
        return Err(AppError::BadRequest(
            "Percentage value must be between 1 and 100.".to_string(),
        ));
    }

    let promo = sqlx::query_as::<_, PromoCode>(
        r#"
        INSERT INTO promo_codes (code, kind, value, description, min_order, max_uses, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (code) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(payload.kind.as_str())
    .bind(payload.value)
    .bind(payload.description.unwrap_or_default())
    .bind(payload.min_order)
    .bind(payload.max_uses)
    .bind(payload.expires_at)
    .fetch_optional(&state.pool)
    .await?;

    let Some(promo) = promo else {
        return Err(AppError::Conflict(format!(
            "Promo code \"{code}\" already exists."
        )));
    };

    notification_service::broadcast_coupon(state, &promo.code, promo.value);

    Ok(promo)
}

/// Partial update. `used_count` and `created_at` can never be overridden from
/// this path; an updated code is re-normalized.
pub async fn update(state: &AppState, id: Uuid, payload: UpdatePromoRequest) -> AppResult<PromoCode> {
    let existing = sqlx::query_as::<_, PromoCode>("SELECT * FROM promo_codes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let code = match payload.code {
        Some(code) => {
            let code = normalize_code(&code);
            if code != existing.code {
                let duplicate: Option<(Uuid,)> =
                    sqlx::query_as("SELECT id FROM promo_codes WHERE code = $1")
                        .bind(&code)
                        .fetch_optional(&state.pool)
                        .await?;
                if duplicate.is_some() {
                    return Err(AppError::Conflict(format!(
                        "Promo code \"{code}\" already exists."
                    )));
                }
            }
            code
        }
        None => existing.code,
    };

    let kind = payload
        .kind
        .map(|k| k.as_str().to_string())
        .unwrap_or(existing.kind);
    let value = payload.value.unwrap_or(existing.value);
    let description = payload.description.unwrap_or(existing.description);
    let min_order = payload.min_order.or(existing.min_order);
    let max_uses = payload.max_uses.or(existing.max_uses);
    let is_active = payload.is_active.unwrap_or(existing.is_active);
    let expires_at = payload.expires_at.or(existing.expires_at);

    let promo = sqlx::query_as::<_, PromoCode>(
        r#"
        UPDATE promo_codes
        SET code = $2, kind = $3, value = $4, description = $5,
            min_order = $6, max_uses = $7, is_active = $8, expires_at = $9
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&code)
    .bind(kind)
    .bind(value)
    .bind(description)
    .bind(min_order)
    .bind(max_uses)
    .bind(is_active)
    .bind(expires_at)
    .fetch_one(&state.pool)
    .await?;

    Ok(promo)
}

pub async fn delete(pool: &DbPool, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM promo_codes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn promo(kind: PromoKind, value: i64) -> PromoCode {
        PromoCode {
            id: Uuid::new_v4(),
            code: "TEST".to_string(),
            kind: kind.as_str().to_string(),
            value,
            description: String::new(),
            min_order: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_discount_rounds_to_minor_units() {
        // 10% of $200.00 is $20.00
        assert_eq!(compute_discount(PromoKind::Percentage, 10, 20_000), 2_000);
        // 15% of $0.33 is $0.0495, rounds to $0.05
        assert_eq!(compute_discount(PromoKind::Percentage, 15, 33), 5);
    }

    #[test]
    fn fixed_discount_never_exceeds_subtotal() {
        // $20.00 off a $5.00 order caps at $5.00
        assert_eq!(compute_discount(PromoKind::Fixed, 2_000, 500), 500);
        assert_eq!(compute_discount(PromoKind::Fixed, 2_000, 10_000), 2_000);
    }

    #[test]
    fn inactive_rejected_before_anything_else() {
        let mut p = promo(PromoKind::Percentage, 10);
        p.is_active = false;
        p.expires_at = Some(Utc::now() - Duration::days(1));
        let err = evaluate(&p, 10_000, Utc::now()).unwrap_err();
        assert_eq!(err, "This promo code is no longer active.");
    }

    #[test]
    fn expired_wins_over_usage_limit() {
        let mut p = promo(PromoKind::Percentage, 10);
        p.expires_at = Some(Utc::now() - Duration::days(1));
        p.max_uses = Some(5);
        p.used_count = 5;
        let err = evaluate(&p, 10_000, Utc::now()).unwrap_err();
        assert_eq!(err, "This promo code has expired.");
    }

    #[test]
    fn usage_limit_checked_when_capped() {
        let mut p = promo(PromoKind::Percentage, 10);
        p.max_uses = Some(3);
        p.used_count = 3;
        let err = evaluate(&p, 10_000, Utc::now()).unwrap_err();
        assert_eq!(err, "This promo code has reached its usage limit.");
    }

    #[test]
    fn unlimited_codes_skip_the_usage_check() {
        let mut p = promo(PromoKind::Percentage, 10);
        p.used_count = 1_000;
        assert_eq!(evaluate(&p, 10_000, Utc::now()).unwrap(), 1_000);
    }

    #[test]
    fn minimum_order_enforced_last() {
        let mut p = promo(PromoKind::Fixed, 500);
        p.min_order = Some(5_000);
        let err = evaluate(&p, 4_999, Utc::now()).unwrap_err();
        assert_eq!(err, "A minimum order of $50.00 is required for this code.");
        assert_eq!(evaluate(&p, 5_000, Utc::now()).unwrap(), 500);
    }

    #[test]
    fn amount_formatting_pads_cents() {
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(2_050), "20.50");
        assert_eq!(format_amount(20_000), "200.00");
    }
}
