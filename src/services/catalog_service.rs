use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::bike::{CatalogBike, Fuel, Transmission};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// Sidebar state of the bike list page. Empty sets mean "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BikeFilter {
    pub transmission: Vec<Transmission>,
    pub fuel: Vec<Fuel>,
    pub location: Option<String>,
    pub sort: Option<SortOrder>,
}

impl BikeFilter {
    fn matches(&self, bike: &CatalogBike) -> bool {
        (self.transmission.is_empty() || self.transmission.contains(&bike.transmission))
            && (self.fuel.is_empty() || self.fuel.contains(&bike.fuel))
            && self
                .location
                .as_deref()
                .filter(|l| !l.is_empty())
                .map_or(true, |l| bike.is_available_at(l))
    }
}

pub struct CatalogService {
    bikes: Vec<CatalogBike>,
}

impl CatalogService {
    pub fn new(bikes: Vec<CatalogBike>) -> Self {
        Self { bikes }
    }

    pub fn bikes(&self) -> &[CatalogBike] {
        &self.bikes
    }

    pub fn find(&self, id: u32) -> Option<&CatalogBike> {
        self.bikes.iter().find(|bike| bike.id == id)
    }

    pub fn search(&self, filter: &BikeFilter) -> Vec<CatalogBike> {
        let mut result: Vec<CatalogBike> = self
            .bikes
            .iter()
            .filter(|bike| filter.matches(bike))
            .cloned()
            .collect();

        match filter.sort {
            Some(SortOrder::Asc) => result.sort_by(|a, b| a.base_price.total_cmp(&b.base_price)),
            Some(SortOrder::Desc) => result.sort_by(|a, b| b.base_price.total_cmp(&a.base_price)),
            None => {}
        }
        result
    }
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new(default_fleet())
    }
}

#[allow(clippy::too_many_arguments)]
fn fleet_bike(
    id: u32,
    name: &str,
    base_price: f64,
    image: &str,
    transmission: Transmission,
    make_year: u16,
    locations: &[&str],
    available: bool,
) -> CatalogBike {
    CatalogBike {
        id,
        name: name.to_string(),
        base_price,
        image: image.to_string(),
        transmission,
        seating: "2-Seater".to_string(),
        fuel: Fuel::Petrol,
        deposit: 500.0,
        make_year,
        locations: locations.iter().map(|l| l.to_string()).collect(),
        available,
    }
}

/// The Pune fleet. The Ola is listed as "Coming Soon".
pub fn default_fleet() -> Vec<CatalogBike> {
    vec![
        fleet_bike(
            1,
            "Honda Shine",
            599.0,
            "/bikes/Hondashine.jpg",
            Transmission::Manual,
            2018,
            &["Hadapsar", "Wakad"],
            true,
        ),
        fleet_bike(
            2,
            "Honda Activa 5G",
            399.0,
            "/bikes/activa.jpg",
            Transmission::Automatic,
            2019,
            &["Wakad", "Kothrud"],
            true,
        ),
        fleet_bike(
            3,
            "Hero Splender",
            299.0,
            "/bikes/splender.jpg",
            Transmission::Automatic,
            2020,
            &["Kothrud", "Hadapsar"],
            true,
        ),
        fleet_bike(
            4,
            "Ola Electric",
            999.0,
            "/bikes/ola.jpg",
            Transmission::Manual,
            2017,
            &["Wakad"],
            false,
        ),
    ]
}
