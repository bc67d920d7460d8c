use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    Manual,
    Automatic,
}

impl FromStr for Transmission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // The listing labels these "Gear" and "Gearless"
            "manual" | "gear" => Ok(Transmission::Manual),
            "automatic" | "gearless" => Ok(Transmission::Automatic),
            other => Err(format!("Unknown transmission type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fuel {
    Petrol,
    Electric,
}

impl FromStr for Fuel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "petrol" => Ok(Fuel::Petrol),
            "electric" => Ok(Fuel::Electric),
            other => Err(format!("Unknown fuel type: {}", other)),
        }
    }
}

/// The bike as carried through checkout and into the booking payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    #[serde(rename = "_id", alias = "id")]
    pub id: u32,
    pub model: String,
    #[serde(default)]
    pub deposit: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalPackage {
    #[serde(default)]
    pub name: String,
    /// Per day
    pub price: Money,
}

/// A listing entry with everything the bike list page filters and sorts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBike {
    pub id: u32,
    pub name: String,
    pub base_price: Money,
    pub image: String,
    pub transmission: Transmission,
    pub seating: String,
    pub fuel: Fuel,
    pub deposit: Money,
    pub make_year: u16,
    pub locations: Vec<String>,
    pub available: bool,
}

impl CatalogBike {
    pub fn as_bike(&self) -> Bike {
        Bike {
            id: self.id,
            model: self.name.clone(),
            deposit: self.deposit,
        }
    }

    pub fn is_available_at(&self, location: &str) -> bool {
        self.locations.iter().any(|l| l == location)
    }
}
