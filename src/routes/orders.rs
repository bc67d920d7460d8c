use actix_web::{web, HttpResponse, Responder};

use crate::state::AppState;

pub async fn get_orders(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.orders().list())
}
