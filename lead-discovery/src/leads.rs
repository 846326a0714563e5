use crate::types::Lead;
use std::collections::HashMap;

/// Narrowing applied to the lead list before display or export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub search: String,
    pub min_score: Option<f64>,
}

impl LeadFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || lead.business_name.to_lowercase().contains(&needle)
            || lead.category.to_lowercase().contains(&needle)
            || lead.city.to_lowercase().contains(&needle);
        let matches_score = self.min_score.map_or(true, |min| lead.lead_score >= min);
        matches_search && matches_score
    }

    pub fn apply<'a>(&self, leads: &'a [Lead]) -> Vec<&'a Lead> {
        leads.iter().filter(|lead| self.matches(lead)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Excellent
        } else if score >= 60.0 {
            ScoreBand::Good
        } else if score >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "excellent",
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Low => "low",
        }
    }
}

/// Largest counts first, ties broken by key, at most `limit` entries.
pub fn top_counts(counts: &HashMap<String, u64>, limit: usize) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = counts.iter().map(|(key, count)| (key.as_str(), *count)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(limit);
    entries
}
