use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::bike::{Bike, RentalPackage};
use super::Money;
use crate::error::CheckoutError;

pub const PAYMENT_METHOD: &str = "Pay at Center";
pub const CONFIRMED_STATUS: &str = "Confirmed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupOption {
    #[default]
    #[serde(rename = "Self Pickup")]
    SelfPickup,
    #[serde(rename = "Delivery at Location")]
    DeliveryAtLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDetails {
    pub address_line: String,
    pub landmark: String,
    pub city: String,
    pub pincode: String,
}

fn default_rental_days() -> u32 {
    1
}

/// Everything the checkout page needs, carried over from the bike details page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub bike: Bike,
    /// Rental cost before deposit, charges and discount
    #[serde(default)]
    pub total_price: Money,
    #[serde(default = "default_rental_days")]
    pub rental_days: u32,
    pub selected_package: RentalPackage,
    #[serde(default)]
    pub address_details: AddressDetails,
    #[serde(default)]
    pub pickup_option: PickupOption,
    pub pickup_date: DateTime<Utc>,
    pub drop_date: DateTime<Utc>,
}

fn ensure_money(label: &str, value: Money) -> Result<(), CheckoutError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CheckoutError::Validation(format!(
            "{} must be a non-negative amount",
            label
        )));
    }
    Ok(())
}

impl BookingDraft {
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.rental_days == 0 {
            return Err(CheckoutError::Validation(
                "Rental days must be at least 1".to_string(),
            ));
        }
        ensure_money("Total price", self.total_price)?;
        ensure_money("Package price", self.selected_package.price)?;
        ensure_money("Deposit", self.bike.deposit)?;
        if self.drop_date < self.pickup_date {
            return Err(CheckoutError::Validation(
                "Drop date must be after pickup date".to_string(),
            ));
        }
        Ok(())
    }
}

/// The body posted to the bookings endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub bike_id: u32,
    pub bike_model: String,
    pub package: RentalPackage,
    pub rental_days: u32,
    #[serde(rename = "totalPrice")]
    pub payable_amount: Money,
    #[serde(rename = "deposit")]
    pub deposit_amount: Money,
    pub delivery_charge: Money,
    pub service_charge: Money,
    pub discount: Money,
    pub pickup_date: DateTime<Utc>,
    pub drop_date: DateTime<Utc>,
    pub address_details: AddressDetails,
    pub payment_method: String,
    pub status: String,
}

/// The resource the bookings endpoint hands back on 201.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingCreated {
    #[serde(rename = "_id", alias = "id", deserialize_with = "deserialize_resource_id")]
    pub id: String,
}

// Some backends hand out numeric ids, others ObjectId strings
fn deserialize_resource_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "unexpected resource id: {}",
            other
        ))),
    }
}
