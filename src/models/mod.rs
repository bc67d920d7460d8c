pub mod bike;
pub mod booking;
pub mod order;
pub mod search;

/// Rupee amounts. The pages work in whole rupees but coupon discounts can be fractional.
pub type Money = f64;
