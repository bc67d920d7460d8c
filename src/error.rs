use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutError {
    Validation(String),
    InvalidCoupon(String),
    Submission(String),
    SubmissionInProgress,
    MissingDraft,
    UnknownBike(u32),
    Storage(String),
}

impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutError::Validation(msg) => write!(f, "{}", msg),
            CheckoutError::InvalidCoupon(_) => write!(f, "Invalid Coupon Code"),
            CheckoutError::Submission(msg) => write!(f, "Booking failed: {}", msg),
            CheckoutError::SubmissionInProgress => {
                write!(f, "A booking request is already being processed")
            }
            CheckoutError::MissingDraft => write!(f, "No Booking Data Found"),
            CheckoutError::UnknownBike(id) => write!(f, "Bike {} not found", id),
            CheckoutError::Storage(err) => write!(f, "Draft storage error: {}", err),
        }
    }
}

impl std::error::Error for CheckoutError {}

impl ResponseError for CheckoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::Validation(_) => StatusCode::BAD_REQUEST,
            CheckoutError::InvalidCoupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CheckoutError::Submission(_) => StatusCode::BAD_GATEWAY,
            CheckoutError::SubmissionInProgress => StatusCode::CONFLICT,
            CheckoutError::MissingDraft | CheckoutError::UnknownBike(_) => StatusCode::NOT_FOUND,
            CheckoutError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            // The checkout page sends the user back to browsing
            CheckoutError::MissingDraft => json!({ "error": self.to_string(), "redirect": "/" }),
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
