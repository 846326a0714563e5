use crate::classifier::{classify, ClassifiedCategories};
use crate::poller::{PollSnapshot, StatusPoller};
use crate::reference::{cities_availability, list_availability, Availability};
use crate::selection::{GroupState, SelectionActions, SelectionSet};
use crate::taxonomy::CategoryTaxonomy;
use crate::traits::DiscoveryBackend;
use crate::types::{
    CityTiers, DiscoveryError, LeadStats, PollConfig, Result, StartRequest, StartResponse,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Which screen the operator is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Discovery,
    Leads,
    Stats,
}

/// Owns everything one operator session needs: reference data, the category
/// selection, and the poller that tracks the backend job.
pub struct DiscoverySessionController {
    backend: Arc<dyn DiscoveryBackend>,
    poller: StatusPoller,
    taxonomy: CategoryTaxonomy,
    countries: Availability<Vec<String>>,
    categories: Availability<Vec<String>>,
    /// Last category list that loaded successfully; classification and
    /// selection are checked against it.
    offered: Vec<String>,
    classified: ClassifiedCategories,
    selection: SelectionSet,
    view: View,
}

impl DiscoverySessionController {
    pub fn new(backend: Arc<dyn DiscoveryBackend>, poll_config: PollConfig) -> Self {
        let poller = StatusPoller::new(backend.clone(), poll_config);
        Self {
            backend,
            poller,
            taxonomy: CategoryTaxonomy::standard().clone(),
            countries: Availability::Loading,
            categories: Availability::Loading,
            offered: Vec::new(),
            classified: ClassifiedCategories::default(),
            selection: SelectionSet::new(),
            view: View::default(),
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: CategoryTaxonomy) -> Self {
        self.taxonomy = taxonomy;
        self.reclassify();
        self
    }

    // Observation

    pub async fn start_observing(&mut self) -> Uuid {
        self.poller.start_observing().await
    }

    pub async fn stop_observing(&mut self) {
        self.poller.stop_observing().await;
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.poller.subscribe()
    }

    pub async fn snapshot(&self) -> PollSnapshot {
        self.poller.snapshot().await
    }

    // Reference data

    /// Fetch countries and categories together. Either may come back
    /// unavailable without affecting the other.
    ///
    /// A failed category refresh keeps the previous classification and
    /// selection; only the availability marker changes.
    pub async fn load_reference_data(&mut self) {
        let (countries, categories) =
            futures::future::join(self.backend.countries(), self.backend.categories()).await;

        self.countries = list_availability("countries", countries);
        self.categories = list_availability("categories", categories);

        let Availability::Available(categories) = &self.categories else {
            if !self.offered.is_empty() {
                warn!("Keeping {} previously loaded categories", self.offered.len());
            }
            return;
        };

        self.offered = categories.clone();
        self.reclassify();

        let pruned = self.selection.retain_offered(&self.offered);
        if pruned > 0 {
            info!("Dropped {} selected categories that are no longer offered", pruned);
        }
        info!(
            "Loaded {} categories in {} groups",
            self.offered.len(),
            self.classified.group_ids().count()
        );
    }

    pub async fn cities(&self, country: &str) -> Availability<CityTiers> {
        cities_availability(country, self.backend.cities(country).await)
    }

    pub fn countries(&self) -> &Availability<Vec<String>> {
        &self.countries
    }

    pub fn categories(&self) -> &Availability<Vec<String>> {
        &self.categories
    }

    pub fn taxonomy(&self) -> &CategoryTaxonomy {
        &self.taxonomy
    }

    pub fn classified(&self) -> &ClassifiedCategories {
        &self.classified
    }

    fn reclassify(&mut self) {
        self.classified = classify(&self.offered, &self.taxonomy);
    }

    fn is_offered(&self, category: &str) -> bool {
        self.classified.contains(category)
    }

    // Selection

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Flip one category. Only offered categories can be added; a selected
    /// category can always be removed.
    pub fn toggle_category(&mut self, category: &str) -> Result<bool> {
        if !self.selection.contains(category) && !self.is_offered(category) {
            warn!("Ignoring selection of unknown category '{}'", category);
            return Err(DiscoveryError::InvalidInput(format!(
                "Category '{}' is not offered by the backend",
                category
            )));
        }
        Ok(self.selection.toggle(category))
    }

    /// Add every category to the selection. Repeats are harmless. Nothing is
    /// added unless all of them are offered.
    pub fn select_categories<S: AsRef<str>>(&mut self, categories: &[S]) -> Result<usize> {
        let unknown: Vec<&str> = categories
            .iter()
            .map(|category| category.as_ref())
            .filter(|category| !self.is_offered(category))
            .collect();
        if !unknown.is_empty() {
            warn!("Refusing to select unknown categories: {:?}", unknown);
            return Err(DiscoveryError::InvalidInput(format!(
                "Categories not offered by the backend: {}",
                unknown.join(", ")
            )));
        }
        Ok(self.selection.select_all(categories))
    }

    /// Select what the group currently shows under `search`.
    pub fn select_group(&mut self, group_id: &str, search: &str) -> usize {
        let visible = self.classified.filtered(group_id, search);
        self.selection.select_all(&visible)
    }

    pub fn deselect_group(&mut self, group_id: &str, search: &str) -> usize {
        let visible = self.classified.filtered(group_id, search);
        self.selection.deselect_all(&visible)
    }

    pub fn group_state(&self, group_id: &str, search: &str) -> GroupState {
        self.selection
            .group_state(&self.classified.filtered(group_id, search))
    }

    pub fn group_actions(&self, group_id: &str, search: &str) -> SelectionActions {
        self.selection
            .actions(&self.classified.filtered(group_id, search))
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // Commands

    /// Launch a run with the current selection as its category filter.
    pub async fn start_with_selection(&mut self, country: &str, city: &str) -> Result<StartResponse> {
        let categories = self.selection.as_filter();
        self.start(country, city, categories).await
    }

    /// Launch a run. `None` (or an empty list) scans every category.
    ///
    /// On success the job is shown as running and the previous run's leads
    /// are cleared before the backend confirms anything.
    pub async fn start(
        &mut self,
        country: &str,
        city: &str,
        categories: Option<Vec<String>>,
    ) -> Result<StartResponse> {
        let country = country.trim();
        let city = city.trim();
        if country.is_empty() || city.is_empty() {
            return Err(DiscoveryError::InvalidInput(
                "Please select a country and enter a city".to_string(),
            ));
        }

        let request = StartRequest {
            country: country.to_string(),
            city: city.to_string(),
            categories: categories.filter(|categories| !categories.is_empty()),
        };

        let response = match self.backend.start(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to start discovery: {}", e);
                return Err(e);
            }
        };

        if !response.success {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "Discovery could not be started".to_string());
            warn!("Start rejected by backend: {}", message);
            return Err(DiscoveryError::CommandRejected { message });
        }

        self.poller
            .apply_local(|snapshot| {
                snapshot.status.is_running = true;
                snapshot.leads.clear();
            })
            .await;
        self.view = View::Leads;

        info!(
            "Discovery started for {}, {} ({})",
            request.city,
            request.country,
            request
                .categories
                .as_ref()
                .map_or_else(|| "all categories".to_string(), |c| format!("{} categories", c.len()))
        );
        Ok(response)
    }

    /// Ask the backend to stop. On success the job is shown as idle until the
    /// next poll says otherwise.
    pub async fn stop(&mut self) -> Result<()> {
        let response = match self.backend.stop().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to stop discovery: {}", e);
                return Err(e);
            }
        };

        if !response.success {
            warn!("Stop rejected by backend");
            return Err(DiscoveryError::CommandRejected {
                message: "Discovery could not be stopped".to_string(),
            });
        }

        self.poller
            .apply_local(|snapshot| snapshot.status.is_running = false)
            .await;
        info!("Discovery stopped");
        Ok(())
    }

    pub async fn stats(&self) -> Result<LeadStats> {
        self.backend.stats().await
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }
}
