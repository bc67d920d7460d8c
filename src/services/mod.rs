pub mod booking;
pub mod catalog_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod pricing_service;
