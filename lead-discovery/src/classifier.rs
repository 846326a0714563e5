use crate::taxonomy::{CategoryTaxonomy, OTHER_GROUP_ID};
use tracing::debug;

/// Categories partitioned into taxonomy groups.
///
/// Groups appear in taxonomy declaration order with `other` last, and only
/// groups that received at least one category are present. Within a group the
/// input order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedCategories {
    groups: Vec<(String, Vec<String>)>,
}

impl ClassifiedCategories {
    pub fn group(&self, id: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(group_id, _)| group_id == id)
            .map(|(_, categories)| categories.as_slice())
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(id, categories)| (id.as_str(), categories.as_slice()))
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(id, _)| id.as_str())
    }

    pub fn contains_group(&self, id: &str) -> bool {
        self.group(id).is_some()
    }

    /// Whether `category` was classified into any group, `other` included.
    pub fn contains(&self, category: &str) -> bool {
        self.groups
            .iter()
            .any(|(_, categories)| categories.iter().any(|c| c == category))
    }

    /// Total number of categories across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, categories)| categories.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One group's categories narrowed by a search term. Unknown groups
    /// yield nothing.
    pub fn filtered(&self, id: &str, term: &str) -> Vec<String> {
        self.group(id)
            .map(|categories| filter_categories(categories, term))
            .unwrap_or_default()
    }
}

/// Partition `categories` into the groups of `taxonomy`.
///
/// Every input string lands in exactly one group: the first whose keywords
/// occur in it (case-insensitively), or `other`.
pub fn classify<S: AsRef<str>>(categories: &[S], taxonomy: &CategoryTaxonomy) -> ClassifiedCategories {
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); taxonomy.len()];
    let mut other = Vec::new();

    for category in categories {
        let category = category.as_ref();
        let lowered = category.to_lowercase();
        match taxonomy.groups().iter().position(|group| group.matches(&lowered)) {
            Some(index) => buckets[index].push(category.to_string()),
            None => other.push(category.to_string()),
        }
    }

    let mut groups: Vec<(String, Vec<String>)> = taxonomy
        .groups()
        .iter()
        .zip(buckets)
        .filter(|(_, bucket)| !bucket.is_empty())
        .map(|(group, bucket)| (group.id.clone(), bucket))
        .collect();

    if !other.is_empty() {
        groups.push((OTHER_GROUP_ID.to_string(), other));
    }

    debug!(
        "Classified {} categories into {} groups",
        categories.len(),
        groups.len()
    );

    ClassifiedCategories { groups }
}

/// Case-insensitive substring filter. A blank term keeps everything.
pub fn filter_categories<S: AsRef<str>>(categories: &[S], term: &str) -> Vec<String> {
    let needle = term.trim().to_lowercase();
    categories
        .iter()
        .map(|category| category.as_ref())
        .filter(|category| needle.is_empty() || category.to_lowercase().contains(&needle))
        .map(str::to_string)
        .collect()
}
