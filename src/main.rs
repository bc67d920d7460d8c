use std::{io, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::info;

use okbikes_api::config::AppConfig;
use okbikes_api::routes;
use okbikes_api::services::booking::provider::HttpBookingProvider;
use okbikes_api::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config =
        AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let provider = HttpBookingProvider::new(&config.booking_api_url, config.booking_timeout)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    info!("Bookings will be posted to {}", provider.endpoint());

    let host = config.host.clone();
    let port = config.port;
    let coupons = Arc::new(config.coupons.clone());
    let state = web::Data::new(AppState::new(config, coupons, Arc::new(provider)));

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
