pub mod cart_service;
pub mod notification_service;
pub mod order_service;
pub mod payment_service;
pub mod promo_service;
