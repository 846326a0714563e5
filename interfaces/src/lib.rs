pub mod defs;

pub use defs::{CityTiers, DiscoveryStatus, Lead, LeadStats, Rating, StartRequest, StartResponse, StopResponse};
