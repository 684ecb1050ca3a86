use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::cart::{
        AddToCartRequest, CartLine, CartMutationResponse, RemoveFromCartRequest,
        RemoveFromCartResponse, UpdateCartRequest,
    },
    error::{AppError, AppResult},
    realtime::RealtimeEvent,
    state::AppState,
};

/// Cart contents joined against live product data. An absent cart is an empty
/// cart, never an error.
pub async fn get_cart(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<CartLine>> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT ci.product_id, ci.quantity, ci.updated_at,
               p.name, p.price, p.stock, p.image, p.category,
               p.seller_email, p.seller_name
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

/// Apply a signed quantity delta. A decrement that would take the quantity
/// below 1 removes the row instead; quantities of 0 or less are never stored.
///
/// The existence check and the increment are separate statements, so two
/// concurrent first-adds can race; the unique (user_id, product_id) index plus
/// the upsert keep the cart consistent either way, and the increment itself is
/// a single atomic statement.
pub async fn add_or_adjust(
    state: &AppState,
    payload: AddToCartRequest,
) -> AppResult<CartMutationResponse> {
    if payload.quantity == 0 {
        return Err(AppError::BadRequest(
            "quantity delta must not be zero".to_string(),
        ));
    }

    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let existing: Option<(i32,)> = sqlx::query_as(
        "SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2",
    )
    .bind(payload.user_id)
    .bind(payload.product_id)
    .fetch_optional(&state.pool)
    .await?;

    let message = if existing.is_some() {
        // Guarded so the stored quantity can never land at 0 or below.
        let updated = sqlx::query(
            r#"
            UPDATE cart_items
            SET quantity = quantity + $3, updated_at = now()
            WHERE user_id = $1 AND product_id = $2 AND quantity + $3 >= 1
            "#,
        )
        .bind(payload.user_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .execute(&state.pool)
        .await?;

        if updated.rows_affected() == 0 {
            sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                .bind(payload.user_id)
                .bind(payload.product_id)
                .execute(&state.pool)
                .await?;
            "Item removed from cart!"
        } else {
            "Cart Updated!"
        }
    } else {
        if payload.quantity < 1 {
            return Err(AppError::BadRequest(
                "quantity must be at least 1 for a new cart item".to_string(),
            ));
        }
        sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = now()
            "#,
        )
        .bind(payload.user_id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .execute(&state.pool)
        .await?;
        "Cart Updated!"
    };

    // Best-effort badge refresh for any connected tabs.
    state
        .realtime
        .emit_to(
            &payload.user_id.to_string(),
            RealtimeEvent::CartUpdated {
                message: "Item added to cart".to_string(),
            },
        )
        .await;

    Ok(CartMutationResponse {
        success: true,
        message: message.to_string(),
    })
}

/// Overwrite a row's quantity. Quantities below 1 are a validation error; the
/// client is expected to call remove instead.
pub async fn set_quantity(
    state: &AppState,
    payload: UpdateCartRequest,
) -> AppResult<CartMutationResponse> {
    if payload.quantity < 1 {
        return Err(AppError::BadRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .execute(&state.pool)
    .await?;

    Ok(CartMutationResponse {
        success: true,
        message: "Cart Updated!".to_string(),
    })
}

/// Unconditional removal; removing an absent item is a no-op success.
pub async fn remove(
    state: &AppState,
    payload: RemoveFromCartRequest,
) -> AppResult<RemoveFromCartResponse> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(payload.user_id)
        .bind(payload.product_id)
        .execute(&state.pool)
        .await?;

    Ok(RemoveFromCartResponse {
        success: true,
        removed: result.rows_affected(),
    })
}
