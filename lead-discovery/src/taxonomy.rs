use crate::types::{DiscoveryError, Result};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Id of the overflow group for categories that match no keyword.
pub const OTHER_GROUP_ID: &str = "other";
pub const OTHER_GROUP_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub id: String,
    pub label: String,
    /// Lowercase fragments; a category belongs to the group when any of them
    /// occurs in the lowercased category string.
    pub keywords: Vec<String>,
}

impl CategoryGroup {
    pub fn new(id: &str, label: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
    }
}

/// Ordered set of groups. Declaration order decides which group wins when a
/// category matches several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTaxonomy {
    groups: Vec<CategoryGroup>,
}

impl CategoryTaxonomy {
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self> {
        let mut seen = HashSet::new();
        for group in &groups {
            if group.id.trim().is_empty() {
                return Err(DiscoveryError::Taxonomy("group id must not be empty".to_string()));
            }
            if group.id == OTHER_GROUP_ID {
                return Err(DiscoveryError::Taxonomy(format!(
                    "group id '{}' is reserved for unmatched categories",
                    OTHER_GROUP_ID
                )));
            }
            if !seen.insert(group.id.as_str()) {
                return Err(DiscoveryError::Taxonomy(format!("duplicate group id '{}'", group.id)));
            }
            if group.keywords.iter().any(|keyword| keyword.is_empty()) {
                return Err(DiscoveryError::Taxonomy(format!(
                    "group '{}' has an empty keyword",
                    group.id
                )));
            }
        }
        Ok(Self { groups })
    }

    /// The built-in taxonomy, built once per process.
    pub fn standard() -> &'static CategoryTaxonomy {
        static STANDARD: OnceLock<CategoryTaxonomy> = OnceLock::new();
        STANDARD.get_or_init(|| CategoryTaxonomy {
            groups: standard_groups(),
        })
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Display label for a group id, including the overflow group.
    pub fn label(&self, id: &str) -> Option<&str> {
        if id == OTHER_GROUP_ID {
            return Some(OTHER_GROUP_LABEL);
        }
        self.group(id).map(|group| group.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// Groups whose keywords are narrow come before groups whose keywords are
// generic ("shop", "clinic", "consult", "auto"), so that the narrow ones win.
fn standard_groups() -> Vec<CategoryGroup> {
    vec![
        CategoryGroup::new(
            "pet",
            "Pet Services",
            &[
                "pet clinic", "pet boarding", "pet training", "pet sitting", "pet daycare", "dog",
                "puppy", "kennel", "cattery", "veterinar", "animal", "grooming",
            ],
        ),
        CategoryGroup::new(
            "manufacturing",
            "Manufacturing & B2B",
            &[
                "manufactur", "fabrication", "machining", "machine shop", "welding", "cnc",
                "industrial", "packaging", "printing", "wholesale",
            ],
        ),
        CategoryGroup::new(
            "digital",
            "Digital & Agencies",
            &[
                "marketing", "seo", "social media", "web design", "web development", "software",
                "app development", "it consulting", "ai consulting", "automation",
            ],
        ),
        CategoryGroup::new(
            "events",
            "Events, Media & Creative",
            &[
                "photograph", "videograph", "event", "wedding", "dj ", "sound system", "party",
                "florist", "decoration",
            ],
        ),
        CategoryGroup::new(
            "fitness",
            "Fitness & Sports",
            &[
                "gym", "fitness", "crossfit", "yoga", "pilates", "martial", "karate", "taekwondo",
                "dance studio", "zumba", "personal trainer", "swimming", "tennis", "badminton",
                "sports", "golf",
            ],
        ),
        CategoryGroup::new(
            "education",
            "Education & Training",
            &[
                "school", "academy", "tutor", "coaching", "institute", "bootcamp", "training",
                "education", "college", "study abroad", "career",
            ],
        ),
        CategoryGroup::new(
            "healthcare",
            "Healthcare & Wellness",
            &[
                "clinic", "hospital", "doctor", "dental", "dentist", "medical", "physio", "chiropract",
                "orthopedic", "dermatolog", "diagnostic", "pathology", "radiology", "imaging",
                "mental health", "psycholog", "psychiatr", "counsel", "nutrition", "dietitian",
                "ayurved", "homeopath", "naturopath", "fertility", "ivf", "pharmacy",
            ],
        ),
        CategoryGroup::new(
            "beauty",
            "Beauty & Personal Care",
            &[
                "salon", "hair", "barber", "nail", "spa", "massage", "esthetic", "makeup", "tattoo",
                "piercing", "laser", "skin care", "beauty",
            ],
        ),
        CategoryGroup::new(
            "real-estate",
            "Real Estate & Property",
            &["real estate", "realtor", "property", "rental agency", "vacation rental", "broker", "housing"],
        ),
        CategoryGroup::new(
            "professional",
            "Professional & Financial",
            &[
                "law firm", "law office", "lawyer", "attorney", "legal", "accountant", "accounting",
                "bookkeeping", "consult", "financ", "invest", "insurance", "tax ", "audit",
                "company registration",
            ],
        ),
        CategoryGroup::new(
            "home-services",
            "Home & Local Services",
            &[
                "plumb", "electrician", "hvac", "air conditioning", "handyman", "carpent", "painter",
                "interior", "renovation", "contractor", "construction", "roofer", "roofing",
                "waterproof", "landscap", "lawn", "cleaning", "pest control", "moving", "movers",
                "locksmith",
            ],
        ),
        CategoryGroup::new(
            "automotive",
            "Automotive",
            &[
                "auto", "car ", "mechanic", "tire", "tyre", "vehicle", "motorcycle", "car wash",
                "detailing", "battery",
            ],
        ),
        CategoryGroup::new(
            "hospitality",
            "Food, Hospitality & Travel",
            &[
                "restaurant", "cafe", "coffee", "bakery", "pizzeria", "kitchen", "catering",
                "food truck", "hotel", "resort", "guest house", "hostel", "travel", "tour",
            ],
        ),
        CategoryGroup::new(
            "retail",
            "Retail & Commerce",
            &[
                "store", "shop", "boutique", "jewel", "optical", "grocery", "e-commerce",
                "supermarket", "clothing", "fashion",
            ],
        ),
        CategoryGroup::new(
            "repair",
            "Repair & Technical",
            &["repair", "it service", "managed it", "technician"],
        ),
    ]
}
