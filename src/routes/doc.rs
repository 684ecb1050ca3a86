use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{
            AddToCartRequest, CartLine, CartMutationResponse, RemoveFromCartRequest,
            RemoveFromCartResponse, UpdateCartRequest,
        },
        notifications::{
            AckResponse, CreateNotificationRequest, MarkAllReadRequest, MarkAllReadResponse,
            RecipientQuery, UnreadCountResponse,
        },
        orders::{
            DailySales, OrderListQuery, PlatformStats, SellerStats, SellerStatsQuery,
            UpdateOrderStatusRequest, UserStats, UserStatsQuery,
        },
        payment::{
            CreateCheckoutSessionRequest, CreateCheckoutSessionResponse, FinalizeSessionResponse,
        },
        promo::{
            CreatePromoRequest, UpdatePromoRequest, ValidatePromoRequest, ValidatePromoResponse,
        },
    },
    models::{
        CartItem, Notification, NotificationType, Order, OrderStatus, Product, PromoCode,
        PromoKind,
    },
    routes::{cart, health, notifications, orders, payment, promo},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_cart,
        cart::remove_from_cart,
        payment::create_checkout_session,
        payment::finalize_checkout_session,
        notifications::create_notification,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_all_read,
        notifications::mark_read,
        notifications::delete_notification,
        promo::validate_promo,
        promo::list_promos,
        promo::create_promo,
        promo::update_promo,
        promo::delete_promo,
        orders::list_orders,
        orders::update_order_status,
        orders::seller_stats,
        orders::user_stats,
        orders::platform_stats
    ),
    components(
        schemas(
            Product,
            CartItem,
            Order,
            OrderStatus,
            Notification,
            NotificationType,
            PromoCode,
            PromoKind,
            CartLine,
            AddToCartRequest,
            UpdateCartRequest,
            RemoveFromCartRequest,
            CartMutationResponse,
            RemoveFromCartResponse,
            CreateCheckoutSessionRequest,
            CreateCheckoutSessionResponse,
            FinalizeSessionResponse,
            CreateNotificationRequest,
            RecipientQuery,
            MarkAllReadRequest,
            MarkAllReadResponse,
            UnreadCountResponse,
            AckResponse,
            ValidatePromoRequest,
            ValidatePromoResponse,
            CreatePromoRequest,
            UpdatePromoRequest,
            OrderListQuery,
            UpdateOrderStatusRequest,
            SellerStatsQuery,
            UserStatsQuery,
            DailySales,
            SellerStats,
            UserStats,
            PlatformStats,
            health::HealthData
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Payment", description = "Checkout session endpoints"),
        (name = "Notifications", description = "Notification endpoints"),
        (name = "Promo", description = "Promo code endpoints"),
        (name = "Orders", description = "Order tracking and dashboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
