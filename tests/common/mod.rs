#![allow(dead_code)]

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use okbikes_api::config::AppConfig;
use okbikes_api::models::booking::{BookingCreated, BookingRequest};
use okbikes_api::routes;
use okbikes_api::services::booking::interface::{BookingError, BookingOperations};
use okbikes_api::services::coupon_service::CouponLookup;
use okbikes_api::state::AppState;

/// Booking endpoint stand-in that counts calls and keeps the last payload.
pub struct FakeBookingProvider {
    response: Mutex<Result<BookingCreated, BookingError>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<BookingRequest>>,
}

impl FakeBookingProvider {
    pub fn accepting(id: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(BookingCreated { id: id.to_string() })),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn rejecting(status: u16, message: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Err(BookingError::Rejected {
                status,
                message: message.map(String::from),
            })),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn respond_with(&self, response: Result<BookingCreated, BookingError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<BookingRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl BookingOperations for FakeBookingProvider {
    fn create_booking<'a>(
        &'a self,
        booking: &'a BookingRequest,
    ) -> BoxFuture<'a, Result<BookingCreated, BookingError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(booking.clone());
        let response = self.response.lock().unwrap().clone();
        Box::pin(async move { response })
    }
}

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new(provider: Arc<FakeBookingProvider>) -> Self {
        let config = AppConfig::default();
        let coupons = Arc::new(config.coupons.clone());
        Self::with_coupons(provider, coupons)
    }

    /// Uses `coupons` in place of the table from the default config.
    pub fn with_coupons(
        provider: Arc<FakeBookingProvider>,
        coupons: Arc<dyn CouponLookup>,
    ) -> Self {
        Self {
            state: web::Data::new(AppState::new(AppConfig::default(), coupons, provider)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure)
    }
}

/// Three days on the Honda Shine at 300/day, matching the pricing example.
pub fn three_day_checkout(pickup_option: &str) -> serde_json::Value {
    serde_json::json!({
        "bikeId": 1,
        "package": { "name": "Daily", "price": 300 },
        "pickupDate": "2025-03-10T09:00:00Z",
        "dropDate": "2025-03-13T09:00:00Z",
        "pickupOption": pickup_option,
        "addressDetails": {
            "addressLine": "12 FC Road",
            "city": "Pune",
            "pincode": "411004"
        }
    })
}
