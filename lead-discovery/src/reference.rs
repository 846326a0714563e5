use crate::types::{CityTiers, Result};
use tracing::warn;

/// Reference data as the operator sees it. Missing data is shown as
/// unavailable, never as an empty list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Availability<T> {
    #[default]
    Loading,
    Available(T),
    Unavailable { reason: String },
}

impl<T> Availability<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Availability::Available(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available(_))
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable { reason: reason.into() }
    }
}

/// Turn a list fetch into an availability, treating an empty list as missing.
pub fn list_availability(what: &str, fetched: Result<Vec<String>>) -> Availability<Vec<String>> {
    match fetched {
        Ok(items) if items.is_empty() => {
            warn!("Backend returned no {}", what);
            Availability::unavailable(format!("No {} available from the backend", what))
        }
        Ok(items) => Availability::Available(items),
        Err(e) => {
            warn!("Failed to load {}: {}", what, e);
            Availability::unavailable(format!("Could not load {}: {}", what, e))
        }
    }
}

pub fn cities_availability(country: &str, fetched: Result<CityTiers>) -> Availability<CityTiers> {
    match fetched {
        Ok(tiers) if tiers.is_empty() => {
            warn!("Backend returned no cities for {}", country);
            Availability::unavailable(format!("No cities available for {}", country))
        }
        Ok(tiers) => Availability::Available(tiers),
        Err(e) => {
            warn!("Failed to load cities for {}: {}", country, e);
            Availability::unavailable(format!("Could not load cities for {}: {}", country, e))
        }
    }
}
