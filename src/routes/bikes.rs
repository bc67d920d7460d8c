use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use std::str::FromStr;

use crate::services::catalog_service::{BikeFilter, SortOrder};
use crate::state::AppState;

/// Multi-select filters come in comma separated, e.g. `?transmission=Manual,Automatic`.
#[derive(Deserialize)]
pub struct QueryParams {
    transmission: Option<String>,
    fuel: Option<String>,
    location: Option<String>,
    sort: Option<String>,
}

fn parse_list<T: FromStr<Err = String>>(raw: Option<&str>) -> Result<Vec<T>, String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

impl QueryParams {
    fn to_filter(&self) -> Result<BikeFilter, String> {
        let sort = match self.sort.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Some(SortOrder::from_str(s)?),
            _ => None,
        };
        Ok(BikeFilter {
            transmission: parse_list(self.transmission.as_deref())?,
            fuel: parse_list(self.fuel.as_deref())?,
            location: self
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
            sort,
        })
    }
}

pub async fn get_bikes(
    state: web::Data<AppState>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    match params.to_filter() {
        Ok(filter) => HttpResponse::Ok().json(state.catalog().search(&filter)),
        Err(err) => HttpResponse::BadRequest().json(serde_json::json!({ "error": err })),
    }
}

pub async fn get_bike(state: web::Data<AppState>, path: web::Path<u32>) -> impl Responder {
    let id = path.into_inner();
    match state.catalog().find(id) {
        Some(bike) => HttpResponse::Ok().json(bike),
        None => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": format!("Bike {} not found", id) })),
    }
}
