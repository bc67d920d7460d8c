use serde::Serialize;

use crate::models::bike::RentalPackage;
use crate::models::booking::{BookingDraft, PickupOption};
use crate::models::Money;

pub const DELIVERY_CHARGE: Money = 250.0;
pub const SERVICE_CHARGE: Money = 2.0;

/// Line items shown under "Price Details" on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base_price: Money,
    pub total_price: Money,
    pub delivery_charge: Money,
    pub service_charge: Money,
    pub deposit_amount: Money,
    pub discount_amount: Money,
    pub payable_amount: Money,
}

pub struct PricingService;

impl PricingService {
    /// Package rate times the number of rental days
    pub fn calculate_base_price(package: &RentalPackage, rental_days: u32) -> Money {
        package.price * rental_days as Money
    }

    pub fn calculate_delivery_charge(pickup_option: PickupOption) -> Money {
        match pickup_option {
            PickupOption::DeliveryAtLocation => DELIVERY_CHARGE,
            PickupOption::SelfPickup => 0.0,
        }
    }

    /// Coupon discount. Only the rental subtotal is discounted, never the
    /// deposit or the delivery and service charges.
    pub fn calculate_discount(total_price: Money, coupon_percent: u8) -> Money {
        total_price * coupon_percent as Money / 100.0
    }

    /// Amount charged at booking time, floored at zero
    pub fn calculate_payable_amount(
        total_price: Money,
        deposit_amount: Money,
        delivery_charge: Money,
        service_charge: Money,
        discount: Money,
    ) -> Money {
        let gross = total_price + deposit_amount + delivery_charge + service_charge;
        (gross - discount).max(0.0)
    }

    pub fn calculate_breakdown(draft: &BookingDraft, coupon_percent: Option<u8>) -> PriceBreakdown {
        let delivery_charge = Self::calculate_delivery_charge(draft.pickup_option);
        let deposit_amount = draft.bike.deposit;
        let discount_amount = coupon_percent
            .map(|percent| Self::calculate_discount(draft.total_price, percent))
            .unwrap_or(0.0);

        PriceBreakdown {
            base_price: Self::calculate_base_price(&draft.selected_package, draft.rental_days),
            total_price: draft.total_price,
            delivery_charge,
            service_charge: SERVICE_CHARGE,
            deposit_amount,
            discount_amount,
            payable_amount: Self::calculate_payable_amount(
                draft.total_price,
                deposit_amount,
                delivery_charge,
                SERVICE_CHARGE,
                discount_amount,
            ),
        }
    }
}
