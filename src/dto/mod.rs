pub mod cart;
pub mod notifications;
pub mod orders;
pub mod payment;
pub mod promo;
