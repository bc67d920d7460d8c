use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::error::CheckoutError;
use crate::models::bike::RentalPackage;
use crate::models::booking::{
    AddressDetails, BookingDraft, BookingRequest, PickupOption, CONFIRMED_STATUS, PAYMENT_METHOD,
};
use crate::models::order::Order;
use crate::services::coupon_service::{resolve_coupon, AppliedCoupon, CouponLookup};
use crate::services::pricing_service::{PriceBreakdown, PricingService};
use crate::state::{AppState, CheckoutSessions};

pub const ORDERS_PAGE: &str = "/orders";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// What the checkout page holds between renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub draft: BookingDraft,
    pub coupon: Option<AppliedCoupon>,
    pub in_flight: bool,
}

impl CheckoutSession {
    pub fn new(draft: BookingDraft) -> Self {
        Self {
            draft,
            coupon: None,
            in_flight: false,
        }
    }

    /// Derived on every call so a coupon change can never leave a stale total.
    pub fn breakdown(&self) -> PriceBreakdown {
        PricingService::calculate_breakdown(&self.draft, self.coupon.as_ref().map(|c| c.percent))
    }

    /// Unknown codes clear any earlier discount before failing.
    pub fn apply_coupon(
        &mut self,
        lookup: &dyn CouponLookup,
        code: &str,
    ) -> Result<&AppliedCoupon, CheckoutError> {
        match resolve_coupon(lookup, code) {
            Ok(applied) => Ok(&*self.coupon.insert(applied)),
            Err(err) => {
                self.coupon = None;
                Err(err)
            }
        }
    }

    pub fn booking_request(&self, price: &PriceBreakdown) -> BookingRequest {
        BookingRequest {
            bike_id: self.draft.bike.id,
            bike_model: self.draft.bike.model.clone(),
            package: self.draft.selected_package.clone(),
            rental_days: self.draft.rental_days,
            payable_amount: price.payable_amount,
            deposit_amount: price.deposit_amount,
            delivery_charge: price.delivery_charge,
            service_charge: price.service_charge,
            discount: price.discount_amount,
            pickup_date: self.draft.pickup_date,
            drop_date: self.draft.drop_date,
            address_details: self.draft.address_details.clone(),
            payment_method: PAYMENT_METHOD.to_string(),
            status: CONFIRMED_STATUS.to_string(),
        }
    }
}

/// "Rent Now" selection coming from the listing and detail pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub bike_id: u32,
    pub package: RentalPackage,
    pub pickup_date: DateTime<Utc>,
    pub drop_date: DateTime<Utc>,
    #[serde(default)]
    pub pickup_option: PickupOption,
    #[serde(default)]
    pub address_details: AddressDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub checkout_id: String,
    pub draft: BookingDraft,
    pub coupon: Option<AppliedCoupon>,
    pub price: PriceBreakdown,
}

impl CheckoutView {
    fn new(checkout_id: &str, session: &CheckoutSession) -> Self {
        Self {
            checkout_id: checkout_id.to_string(),
            draft: session.draft.clone(),
            coupon: session.coupon.clone(),
            price: session.breakdown(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub order: Order,
    pub redirect_to: String,
    pub redirect_after_ms: u64,
}

/// Whole days between pickup and drop, rounded up, at least one.
pub fn rental_days_between(
    pickup: DateTime<Utc>,
    drop: DateTime<Utc>,
) -> Result<u32, CheckoutError> {
    let seconds = (drop - pickup).num_seconds();
    if seconds <= 0 {
        return Err(CheckoutError::Validation(
            "Drop date must be after pickup date".to_string(),
        ));
    }
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(days.max(1))
        .map_err(|_| CheckoutError::Validation("Rental period is too long".to_string()))
}

fn whole_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

// Clears the in-flight flag even if the submitting request is dropped mid-await
struct SubmissionGuard<'a> {
    sessions: &'a CheckoutSessions,
    key: &'a str,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.sessions.finish_submission(self.key);
    }
}

pub struct CheckoutService;

impl CheckoutService {
    /// Builds a draft from a catalogue selection and opens checkout on it.
    pub fn start(state: &AppState, request: CheckoutRequest) -> Result<CheckoutView, CheckoutError> {
        let bike = state
            .catalog()
            .find(request.bike_id)
            .ok_or(CheckoutError::UnknownBike(request.bike_id))?;
        if !bike.available {
            return Err(CheckoutError::Validation(format!(
                "{} is coming soon and cannot be rented yet",
                bike.name
            )));
        }

        let rental_days = rental_days_between(request.pickup_date, request.drop_date)?;
        let draft = BookingDraft {
            bike: bike.as_bike(),
            total_price: PricingService::calculate_base_price(&request.package, rental_days),
            rental_days,
            selected_package: request.package,
            address_details: request.address_details,
            pickup_option: request.pickup_option,
            pickup_date: request.pickup_date,
            drop_date: request.drop_date,
        };

        let checkout_id = Uuid::new_v4().to_string();
        Self::enter(state, &checkout_id, Some(draft))
    }

    /// Resolves the draft for a checkout page: navigation state first, then
    /// the live session, then the persisted draft.
    pub fn enter(
        state: &AppState,
        checkout_id: &str,
        navigation: Option<BookingDraft>,
    ) -> Result<CheckoutView, CheckoutError> {
        if let Some(draft) = navigation {
            draft.validate()?;
            let expires_at = state.drafts().save(checkout_id, &draft)?;
            let session = CheckoutSession::new(draft);
            let view = CheckoutView::new(checkout_id, &session);
            state.sessions().open(checkout_id, session, expires_at);
            return Ok(view);
        }

        if let Some(session) = state.sessions().get(checkout_id) {
            return Ok(CheckoutView::new(checkout_id, &session));
        }

        Self::restore(state, checkout_id)
    }

    /// Reopens a checkout from its persisted draft. A session opened by a
    /// concurrent request in the meantime wins over the restored one.
    fn restore(state: &AppState, checkout_id: &str) -> Result<CheckoutView, CheckoutError> {
        let (draft, expires_at) = state
            .drafts()
            .load_entry(checkout_id)?
            .ok_or(CheckoutError::MissingDraft)?;

        let session = state.sessions().open_if_absent(
            checkout_id,
            || {
                info!("Restored checkout {} from persisted draft", checkout_id);
                CheckoutSession::new(draft)
            },
            expires_at,
        );
        Ok(CheckoutView::new(checkout_id, &session))
    }

    pub fn apply_coupon(
        state: &AppState,
        checkout_id: &str,
        code: &str,
    ) -> Result<CheckoutView, CheckoutError> {
        // A reload may have dropped the live session
        Self::enter(state, checkout_id, None)?;

        state
            .sessions()
            .update(checkout_id, |session| -> Result<CheckoutView, CheckoutError> {
                session.apply_coupon(state.coupons(), code)?;
                Ok(CheckoutView::new(checkout_id, session))
            })
            .ok_or(CheckoutError::MissingDraft)?
    }

    pub async fn submit(
        state: &AppState,
        checkout_id: &str,
        terms_accepted: bool,
    ) -> Result<BookingConfirmation, CheckoutError> {
        if !terms_accepted {
            return Err(CheckoutError::Validation(
                "Please accept the terms and conditions".to_string(),
            ));
        }

        Self::enter(state, checkout_id, None)?;
        let session = state.sessions().begin_submission(checkout_id)?;
        let _guard = SubmissionGuard {
            sessions: state.sessions(),
            key: checkout_id,
        };

        let price = session.breakdown();
        let request = session.booking_request(&price);

        match state.bookings().create_booking(&request).await {
            Ok(created) => {
                let order = Order::confirmed(created.id, &session.draft, price.payable_amount);
                state.orders().record(order.clone());
                state.drafts().remove(checkout_id);
                state.sessions().remove(checkout_id);
                info!("Checkout {} confirmed as order {}", checkout_id, order.id);

                Ok(BookingConfirmation {
                    order,
                    redirect_to: ORDERS_PAGE.to_string(),
                    redirect_after_ms: whole_millis(state.config().redirect_delay),
                })
            }
            Err(err) => {
                warn!("Booking error for checkout {}: {}", checkout_id, err);
                Err(CheckoutError::Submission(err.user_message()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::booking::BookingCreated;
    use crate::services::booking::interface::{BookingError, BookingOperations};
    use crate::services::coupon_service::StaticCouponTable;
    use chrono::TimeZone;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Notify;

    /// Holds every booking until the test releases the gate.
    #[derive(Default)]
    struct GatedProvider {
        gate: Notify,
        calls: AtomicUsize,
    }

    impl BookingOperations for GatedProvider {
        fn create_booking<'a>(
            &'a self,
            _booking: &'a BookingRequest,
        ) -> BoxFuture<'a, Result<BookingCreated, BookingError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                self.gate.notified().await;
                Ok::<_, BookingError>(BookingCreated {
                    id: "bk-1".to_string(),
                })
            })
        }
    }

    struct FailingProvider;

    impl BookingOperations for FailingProvider {
        fn create_booking<'a>(
            &'a self,
            _booking: &'a BookingRequest,
        ) -> BoxFuture<'a, Result<BookingCreated, BookingError>> {
            Box::pin(async {
                Err::<BookingCreated, _>(BookingError::Rejected {
                    status: 500,
                    message: None,
                })
            })
        }
    }

    fn state_with(provider: Arc<dyn BookingOperations>) -> AppState {
        state_with_config(AppConfig::default(), provider)
    }

    fn state_with_config(config: AppConfig, provider: Arc<dyn BookingOperations>) -> AppState {
        AppState::new(config, Arc::new(StaticCouponTable::default()), provider)
    }

    fn three_day_request(pickup_option: PickupOption) -> CheckoutRequest {
        CheckoutRequest {
            bike_id: 1,
            package: RentalPackage {
                name: "Daily".to_string(),
                price: 300.0,
            },
            pickup_date: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            drop_date: Utc.with_ymd_and_hms(2025, 3, 13, 9, 0, 0).unwrap(),
            pickup_option,
            address_details: AddressDetails::default(),
        }
    }

    #[test]
    fn test_rental_days_round_up() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        assert_eq!(
            rental_days_between(start, start + chrono::Duration::hours(24)),
            Ok(1)
        );
        assert_eq!(
            rental_days_between(start, start + chrono::Duration::hours(25)),
            Ok(2)
        );
        assert_eq!(
            rental_days_between(start, start + chrono::Duration::minutes(30)),
            Ok(1)
        );
        assert!(rental_days_between(start, start).is_err());
    }

    #[test]
    fn test_start_prices_the_example_checkout() {
        let state = state_with(Arc::new(FailingProvider));
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();
        assert_eq!(view.draft.rental_days, 3);
        assert_eq!(view.price.total_price, 900.0);

        let view = CheckoutService::apply_coupon(&state, &view.checkout_id, "RENT20").unwrap();
        assert_eq!(view.price.discount_amount, 180.0);
        assert_eq!(view.price.payable_amount, 1222.0);
    }

    #[test]
    fn test_start_rejects_unknown_and_unavailable_bikes() {
        let state = state_with(Arc::new(FailingProvider));

        let mut request = three_day_request(PickupOption::SelfPickup);
        request.bike_id = 42;
        assert_eq!(
            CheckoutService::start(&state, request).unwrap_err(),
            CheckoutError::UnknownBike(42)
        );

        let mut request = three_day_request(PickupOption::SelfPickup);
        request.bike_id = 4;
        assert!(matches!(
            CheckoutService::start(&state, request),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_coupon_resets_discount() {
        let state = state_with(Arc::new(FailingProvider));
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();
        let id = view.checkout_id;

        let first = CheckoutService::apply_coupon(&state, &id, "save10").unwrap();
        let again = CheckoutService::apply_coupon(&state, &id, "SAVE10").unwrap();
        assert_eq!(first.price, again.price);
        assert_eq!(first.price.discount_amount, 90.0);

        assert_eq!(
            CheckoutService::apply_coupon(&state, &id, "BOGUS").unwrap_err(),
            CheckoutError::InvalidCoupon("BOGUS".to_string())
        );
        let view = CheckoutService::enter(&state, &id, None).unwrap();
        assert_eq!(view.price.discount_amount, 0.0);
        assert!(view.coupon.is_none());
    }

    #[test]
    fn test_enter_restores_persisted_draft() {
        let state = state_with(Arc::new(FailingProvider));
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();
        CheckoutService::apply_coupon(&state, &view.checkout_id, "RENT20").unwrap();

        // Reload: the page state is gone but the persisted draft is not
        state.sessions().remove(&view.checkout_id);
        let restored = CheckoutService::enter(&state, &view.checkout_id, None).unwrap();
        assert_eq!(restored.draft, view.draft);
        assert!(restored.coupon.is_none());

        assert_eq!(
            CheckoutService::enter(&state, "nope", None).unwrap_err(),
            CheckoutError::MissingDraft
        );
    }

    #[test]
    fn test_expired_checkout_is_missing_and_swept() {
        let config = AppConfig {
            draft_ttl: std::time::Duration::ZERO,
            ..AppConfig::default()
        };
        let state = state_with_config(config, Arc::new(FailingProvider));

        let mut ids = Vec::new();
        for _ in 0..20 {
            let view =
                CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
                    .unwrap();
            ids.push(view.checkout_id);
        }
        assert!(state.sessions().len() <= 1);
        assert!(state.drafts().len() <= 1);

        for id in &ids {
            assert_eq!(
                CheckoutService::enter(&state, id, None).unwrap_err(),
                CheckoutError::MissingDraft
            );
            assert_eq!(
                CheckoutService::apply_coupon(&state, id, "SAVE10").unwrap_err(),
                CheckoutError::MissingDraft
            );
        }
        assert!(state.sessions().is_empty());
    }

    #[actix_rt::test]
    async fn test_restore_keeps_a_submission_in_flight() {
        let provider = Arc::new(GatedProvider::default());
        let state = state_with(provider.clone());
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();
        let id = view.checkout_id.as_str();
        state.sessions().remove(id);

        let (first, second) = futures::join!(CheckoutService::submit(&state, id, true), async {
            // Another tab restoring the same checkout mid-submit
            let restored = CheckoutService::restore(&state, id).unwrap();
            assert_eq!(restored.draft, view.draft);
            let second = CheckoutService::submit(&state, id, true).await;
            provider.gate.notify_one();
            second
        });

        assert_eq!(second.unwrap_err(), CheckoutError::SubmissionInProgress);
        assert!(first.is_ok());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_redirect_delay_saturates() {
        assert_eq!(whole_millis(Duration::from_millis(2000)), 2000);
        assert_eq!(whole_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_terms_must_be_accepted() {
        let provider = Arc::new(GatedProvider::default());
        let state = state_with(provider.clone());
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();

        let result =
            tokio_test::block_on(CheckoutService::submit(&state, &view.checkout_id, false));
        assert!(matches!(result, Err(CheckoutError::Validation(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_rt::test]
    async fn test_double_submit_issues_one_request() {
        let provider = Arc::new(GatedProvider::default());
        let state = state_with(provider.clone());
        let view = CheckoutService::start(
            &state,
            three_day_request(PickupOption::DeliveryAtLocation),
        )
        .unwrap();
        let id = view.checkout_id.as_str();

        let (first, second) = futures::join!(CheckoutService::submit(&state, id, true), async {
            let second = CheckoutService::submit(&state, id, true).await;
            provider.gate.notify_one();
            second
        });

        assert_eq!(second.unwrap_err(), CheckoutError::SubmissionInProgress);
        let confirmation = first.unwrap();
        assert_eq!(confirmation.order.id, "bk-1");
        assert_eq!(confirmation.order.total_price, 1652.0);
        assert_eq!(confirmation.redirect_to, "/orders");
        assert_eq!(confirmation.redirect_after_ms, 2000);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        assert!(!state.drafts().contains(id));
        assert_eq!(state.orders().list().len(), 1);
        assert_eq!(
            CheckoutService::enter(&state, id, None).unwrap_err(),
            CheckoutError::MissingDraft
        );
    }

    #[actix_rt::test]
    async fn test_failed_submission_can_be_retried() {
        let state = state_with(Arc::new(FailingProvider));
        let view = CheckoutService::start(&state, three_day_request(PickupOption::SelfPickup))
            .unwrap();
        let id = view.checkout_id.as_str();
        CheckoutService::apply_coupon(&state, id, "RENT20").unwrap();

        let err = CheckoutService::submit(&state, id, true).await.unwrap_err();
        assert_eq!(err, CheckoutError::Submission("Server error".to_string()));

        let session = state.sessions().get(id).unwrap();
        assert!(!session.in_flight);
        assert_eq!(session.coupon.map(|c| c.code), Some("RENT20".to_string()));
        assert!(state.drafts().contains(id));

        // Same outcome on retry, nothing stuck in flight
        let err = CheckoutService::submit(&state, id, true).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submission(_)));
        assert!(state.orders().list().is_empty());
    }
}
