use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::BookingDraft;
use super::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub bike: String,
    pub rental_days: u32,
    /// What the customer was charged, deposit and charges included
    pub total_price: Money,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

impl Order {
    pub fn confirmed(id: String, draft: &BookingDraft, payable_amount: Money) -> Self {
        Self {
            id,
            bike: draft.bike.model.clone(),
            rental_days: draft.rental_days,
            total_price: payable_amount,
            order_date: Utc::now(),
            status: OrderStatus::Confirmed,
        }
    }
}
