use std::collections::HashSet;
use tracing::debug;

/// How much of a subset is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    None,
    Some,
    All,
}

/// Which bulk actions make sense for a subset right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionActions {
    pub select_all_enabled: bool,
    pub deselect_all_enabled: bool,
}

/// Categories chosen by the operator, in the order they were chosen.
///
/// An empty selection is meaningful: it asks the backend to scan every
/// category. Equality is set equality; insertion order only shapes the
/// filter sent to the backend.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.members.contains(category)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Flip membership. Returns whether the category is selected afterwards.
    pub fn toggle(&mut self, category: &str) -> bool {
        if self.members.remove(category) {
            self.order.retain(|member| member != category);
            false
        } else {
            self.insert(category);
            true
        }
    }

    /// Select every category of `subset`; selections outside it are untouched.
    pub fn select_all<S: AsRef<str>>(&mut self, subset: &[S]) -> usize {
        let before = self.len();
        for category in subset {
            self.insert(category.as_ref());
        }
        let added = self.len() - before;
        debug!("Selected {} of {} categories", added, subset.len());
        added
    }

    /// Deselect every category of `subset`; selections outside it are untouched.
    pub fn deselect_all<S: AsRef<str>>(&mut self, subset: &[S]) -> usize {
        let targets: HashSet<&str> = subset.iter().map(|category| category.as_ref()).collect();
        let before = self.len();
        self.order.retain(|member| !targets.contains(member.as_str()));
        self.members.retain(|member| !targets.contains(member.as_str()));
        let removed = before - self.len();
        debug!("Deselected {} of {} categories", removed, subset.len());
        removed
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn group_state<S: AsRef<str>>(&self, subset: &[S]) -> GroupState {
        let selected = subset
            .iter()
            .filter(|category| self.contains(category.as_ref()))
            .count();

        if selected == 0 {
            GroupState::None
        } else if selected == subset.len() {
            GroupState::All
        } else {
            GroupState::Some
        }
    }

    pub fn actions<S: AsRef<str>>(&self, subset: &[S]) -> SelectionActions {
        let state = self.group_state(subset);
        SelectionActions {
            select_all_enabled: state != GroupState::All,
            deselect_all_enabled: state != GroupState::None,
        }
    }

    /// The category filter to send with a start command. `None` means no
    /// filter at all, never "zero categories".
    pub fn as_filter(&self) -> Option<Vec<String>> {
        if self.is_empty() {
            None
        } else {
            Some(self.order.clone())
        }
    }

    /// Drop selections that are no longer offered. Returns how many were dropped.
    pub fn retain_offered<S: AsRef<str>>(&mut self, offered: &[S]) -> usize {
        let offered: HashSet<&str> = offered.iter().map(|category| category.as_ref()).collect();
        let before = self.len();
        self.order.retain(|member| offered.contains(member.as_str()));
        self.members.retain(|member| offered.contains(member.as_str()));
        before - self.len()
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            "All categories".to_string()
        } else {
            format!("{} selected", self.len())
        }
    }

    fn insert(&mut self, category: &str) {
        if self.members.insert(category.to_string()) {
            self.order.push(category.to_string());
        }
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for SelectionSet {}

impl<S: AsRef<str>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = SelectionSet::new();
        for category in iter {
            selection.insert(category.as_ref());
        }
        selection
    }
}
