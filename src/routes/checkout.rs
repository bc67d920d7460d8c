use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::CheckoutError;
use crate::services::checkout_service::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CouponInput {
    code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInput {
    #[serde(default, alias = "terms_accepted")]
    terms_accepted: bool,
}

pub async fn start_checkout(
    state: web::Data<AppState>,
    input: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, CheckoutError> {
    let view = CheckoutService::start(&state, input.into_inner())?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn get_checkout(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, CheckoutError> {
    let view = CheckoutService::enter(&state, &path.into_inner(), None)?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn apply_coupon(
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<CouponInput>,
) -> Result<HttpResponse, CheckoutError> {
    let view = CheckoutService::apply_coupon(&state, &path.into_inner(), &input.code)?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn submit_booking(
    state: web::Data<AppState>,
    path: web::Path<String>,
    input: web::Json<SubmitInput>,
) -> Result<HttpResponse, CheckoutError> {
    let confirmation =
        CheckoutService::submit(&state, &path.into_inner(), input.terms_accepted).await?;
    Ok(HttpResponse::Created().json(confirmation))
}
