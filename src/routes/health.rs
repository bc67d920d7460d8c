use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Level {
    Ok,
    Warning,
}

#[derive(Serialize)]
struct ComponentReport {
    status: Level,
    details: String,
}

impl ComponentReport {
    fn ok(details: String) -> Self {
        Self {
            status: Level::Ok,
            details,
        }
    }

    fn warning(details: String) -> Self {
        Self {
            status: Level::Warning,
            details,
        }
    }
}

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    services: BTreeMap<&'static str, ComponentReport>,
    orders_recorded: usize,
    environment: String,
    version: &'static str,
}

/// Reports configuration problems without calling the bookings backend.
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let environment = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());

    let mut services = BTreeMap::new();
    services.insert("bookings", bookings_target(&state, &environment));
    services.insert("coupons", coupon_table(&state));

    let degraded = services.values().any(|s| s.status != Level::Ok);

    HttpResponse::Ok().json(HealthReport {
        status: if degraded { "degraded" } else { "ok" },
        services,
        orders_recorded: state.orders().list().len(),
        environment,
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn bookings_target(state: &AppState, environment: &str) -> ComponentReport {
    let url = &state.config().booking_api_url;
    let local = matches!(url.host_str(), Some("localhost") | Some("127.0.0.1"));
    if environment == "production" && local {
        return ComponentReport::warning(format!("Bookings still point at {}", url));
    }
    ComponentReport::ok(format!("Bookings posted to {}", url))
}

fn coupon_table(state: &AppState) -> ComponentReport {
    match state.coupons().code_count() {
        0 => ComponentReport::warning("No coupon codes configured".to_string()),
        n => ComponentReport::ok(format!("{} coupon codes configured", n)),
    }
}
