use futures::future::BoxFuture;

use crate::models::booking::{BookingCreated, BookingRequest};

pub const GENERIC_FAILURE: &str = "Server error";

#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// The endpoint answered with an error status
    Rejected {
        status: u16,
        message: Option<String>,
    },
    /// A success status other than 201 Created
    UnexpectedStatus(u16),
    InvalidResponse(String),
    RequestError(String),
    ConfigError(String),
}

impl BookingError {
    /// What the checkout page shows after "Booking failed:".
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::Rejected { status, message } => match message {
                Some(message) => write!(f, "Booking rejected ({}): {}", status, message),
                None => write!(f, "Booking rejected ({})", status),
            },
            BookingError::UnexpectedStatus(status) => {
                write!(f, "Unexpected booking response status: {}", status)
            }
            BookingError::InvalidResponse(err) => write!(f, "Invalid booking response: {}", err),
            BookingError::RequestError(err) => write!(f, "Request error: {}", err),
            BookingError::ConfigError(err) => write!(f, "Booking client error: {}", err),
        }
    }
}

impl std::error::Error for BookingError {}

pub trait BookingOperations: Send + Sync {
    fn create_booking<'a>(
        &'a self,
        booking: &'a BookingRequest,
    ) -> BoxFuture<'a, Result<BookingCreated, BookingError>>;
}
