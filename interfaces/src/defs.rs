use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

// Wire note:
// These types mirror the JSON bodies exchanged with the discovery backend.
// The backend is lenient about what it emits (missing keys, nulls where a
// string is expected), so decoding is lenient as well: absent or null fields
// fall back to their defaults instead of failing the whole payload.

/// Snapshot of the backend job, as returned by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub is_running: bool,
    pub run_id: Option<String>,
    pub current_country: Option<String>,
    pub current_city: Option<String>,
    pub current_category: Option<String>,
}

impl DiscoveryStatus {
    /// Active means the job is running and we know which run it is.
    pub fn is_active(&self) -> bool {
        self.is_running && self.run_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn idle() -> Self {
        Self::default()
    }
}

/// Google-style rating; the backend sends a number, a placeholder string
/// such as `"N/A"`, or nothing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Text(String),
    #[default]
    Missing,
}

impl Rating {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Rating::Score(value) => Some(*value),
            Rating::Text(text) => text.trim().parse().ok(),
            Rating::Missing => None,
        }
    }
}

/// One discovered business. Immutable once received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lead {
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    pub rating: Rating,
    #[serde(deserialize_with = "null_as_default")]
    pub review_count: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub lead_score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub value_justification: String,
    #[serde(deserialize_with = "null_as_default")]
    pub run_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Body of `POST /start`. An absent `categories` key means "scan everything";
/// it is never sent as an empty array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    pub country: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResponse {
    pub success: bool,
}

/// Cities of one country bucketed by size, from `GET /cities?country=`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityTiers {
    #[serde(rename = "Tier 1", default)]
    pub tier_1: Vec<String>,
    #[serde(rename = "Tier 2", default)]
    pub tier_2: Vec<String>,
    #[serde(rename = "Tier 3", default)]
    pub tier_3: Vec<String>,
}

impl CityTiers {
    pub fn tiers(&self) -> [(&'static str, &[String]); 3] {
        [
            ("Tier 1", self.tier_1.as_slice()),
            ("Tier 2", self.tier_2.as_slice()),
            ("Tier 3", self.tier_3.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.tier_1.is_empty() && self.tier_2.is_empty() && self.tier_3.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tier_1.len() + self.tier_2.len() + self.tier_3.len()
    }
}

/// Aggregate counters from `GET /stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadStats {
    pub total_leads: u64,
    pub avg_score: f64,
    pub by_category: HashMap<String, u64>,
    pub by_country: HashMap<String, u64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
