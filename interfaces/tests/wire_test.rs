use interfaces::{CityTiers, DiscoveryStatus, Lead, LeadStats, Rating, StartRequest, StartResponse};
use serde_json::json;

#[test]
fn status_decodes_idle_and_active_payloads() {
    let idle: DiscoveryStatus = serde_json::from_value(json!({
        "is_running": false,
        "run_id": null,
        "current_country": null,
        "current_city": null,
        "current_category": null
    }))
    .unwrap();
    assert_eq!(idle, DiscoveryStatus::idle());
    assert!(!idle.is_active());

    let active: DiscoveryStatus = serde_json::from_value(json!({
        "is_running": true,
        "run_id": "run-42",
        "current_country": "India",
        "current_city": "Pune",
        "current_category": "dental clinic",
        "leads_found": 12
    }))
    .unwrap();
    assert!(active.is_active());
    assert_eq!(active.current_category.as_deref(), Some("dental clinic"));
}

#[test]
fn running_without_run_id_is_not_active() {
    let status: DiscoveryStatus = serde_json::from_value(json!({ "is_running": true })).unwrap();
    assert!(status.is_running);
    assert!(!status.is_active());
}

#[test]
fn lead_tolerates_nulls_and_missing_fields() {
    let lead: Lead = serde_json::from_value(json!({
        "business_name": "Bright Smiles",
        "category": "dental clinic",
        "phone": null,
        "rating": "N/A",
        "review_count": null,
        "lead_score": 72,
        "run_id": "run-1"
    }))
    .unwrap();

    assert_eq!(lead.business_name, "Bright Smiles");
    assert_eq!(lead.phone, "");
    assert_eq!(lead.email, "");
    assert_eq!(lead.review_count, 0);
    assert_eq!(lead.lead_score, 72.0);
    assert_eq!(lead.rating, Rating::Text("N/A".to_string()));
    assert_eq!(lead.rating.as_f64(), None);
}

#[test]
fn rating_accepts_number_text_and_null() {
    let ratings: Vec<Rating> = serde_json::from_value(json!([4.3, "3.9", null])).unwrap();
    assert_eq!(ratings[0], Rating::Score(4.3));
    assert_eq!(ratings[1].as_f64(), Some(3.9));
    assert_eq!(ratings[2], Rating::Missing);
}

#[test]
fn start_request_omits_categories_when_unfiltered() {
    let unfiltered = StartRequest {
        country: "India".to_string(),
        city: "Pune".to_string(),
        categories: None,
    };
    let body = serde_json::to_value(&unfiltered).unwrap();
    assert_eq!(body, json!({ "country": "India", "city": "Pune" }));

    let filtered = StartRequest {
        categories: Some(vec!["gym".to_string()]),
        ..unfiltered
    };
    let body = serde_json::to_value(&filtered).unwrap();
    assert_eq!(body["categories"], json!(["gym"]));
}

#[test]
fn start_response_message_is_optional() {
    let response: StartResponse = serde_json::from_value(json!({ "success": true })).unwrap();
    assert!(response.success);
    assert_eq!(response.message, None);
}

#[test]
fn city_tiers_use_spaced_keys() {
    let tiers: CityTiers = serde_json::from_value(json!({
        "Tier 1": ["Mumbai", "Delhi"],
        "Tier 2": ["Pune"],
        "Tier 3": []
    }))
    .unwrap();
    assert_eq!(tiers.len(), 3);
    assert!(!tiers.is_empty());
    assert_eq!(tiers.tiers()[1], ("Tier 2", &["Pune".to_string()][..]));

    let empty: CityTiers = serde_json::from_value(json!({})).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn stats_default_when_backend_has_no_leads() {
    let stats: LeadStats = serde_json::from_value(json!({
        "total_leads": 0,
        "avg_score": 0,
        "by_category": {},
        "by_country": {}
    }))
    .unwrap();
    assert_eq!(stats, LeadStats::default());
}
