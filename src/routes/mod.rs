pub mod bikes;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod search;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/search")
                        .route("", web::post().to(search::search))
                        .route("/defaults", web::get().to(search::get_defaults)),
                )
                .service(
                    web::scope("/bikes")
                        .route("", web::get().to(bikes::get_bikes))
                        .route("/{id}", web::get().to(bikes::get_bike)),
                )
                .service(
                    web::scope("/checkout")
                        .route("", web::post().to(checkout::start_checkout))
                        .route("/{id}", web::get().to(checkout::get_checkout))
                        .route("/{id}/coupon", web::post().to(checkout::apply_coupon))
                        .route("/{id}/submit", web::post().to(checkout::submit_booking)),
                )
                .route("/orders", web::get().to(orders::get_orders)),
        );
}
