use futures::future::BoxFuture;
use log::{info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::interface::{BookingError, BookingOperations};
use crate::models::booking::{BookingCreated, BookingRequest};

pub const BOOKINGS_PATH: &str = "api/bookings";

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Posts bookings to the rental backend's REST endpoint.
pub struct HttpBookingProvider {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBookingProvider {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, BookingError> {
        let endpoint = base_url
            .join(BOOKINGS_PATH)
            .map_err(|e| BookingError::ConfigError(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::ConfigError(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_booking(&self, booking: &BookingRequest) -> Result<BookingCreated, BookingError> {
        info!(
            "Submitting booking for bike {} to {}",
            booking.bike_id, self.endpoint
        );

        let res = self
            .client
            .post(self.endpoint.clone())
            .json(booking)
            .send()
            .await
            .map_err(|e| BookingError::RequestError(e.to_string()))?;

        let status = res.status();
        if status == StatusCode::CREATED {
            return res
                .json::<BookingCreated>()
                .await
                .map_err(|e| BookingError::InvalidResponse(e.to_string()));
        }

        if status.is_success() {
            warn!("Bookings endpoint answered {} instead of 201", status);
            return Err(BookingError::UnexpectedStatus(status.as_u16()));
        }

        let body = res.text().await.unwrap_or_default();
        warn!("Bookings endpoint rejected booking ({}): {}", status, body);
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        Err(BookingError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

impl BookingOperations for HttpBookingProvider {
    fn create_booking<'a>(
        &'a self,
        booking: &'a BookingRequest,
    ) -> BoxFuture<'a, Result<BookingCreated, BookingError>> {
        Box::pin(self.post_booking(booking))
    }
}
