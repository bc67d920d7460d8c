use actix_web::{web, HttpResponse, Responder};
use chrono::Local;

use crate::models::search::SearchForm;

pub async fn get_defaults() -> impl Responder {
    HttpResponse::Ok().json(SearchForm::defaults(Local::now().naive_local()))
}

/// Validates the landing page form before the user is sent to the bike list.
pub async fn search(input: web::Json<SearchForm>) -> impl Responder {
    let form = input.into_inner();
    match form.validate() {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "form": form,
            "next": "/bike-list",
        })),
        Err(errors) => HttpResponse::BadRequest().json(serde_json::json!({ "errors": errors })),
    }
}
