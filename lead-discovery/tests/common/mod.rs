#![allow(dead_code)]

use async_trait::async_trait;
use lead_discovery::{
    CityTiers, DiscoveryBackend, DiscoveryError, DiscoveryStatus, Lead, LeadStats, Rating, Result,
    StartRequest, StartResponse, StopResponse,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn idle_status() -> DiscoveryStatus {
    DiscoveryStatus::idle()
}

pub fn active_status(run_id: &str) -> DiscoveryStatus {
    DiscoveryStatus {
        is_running: true,
        run_id: Some(run_id.to_string()),
        current_country: Some("India".to_string()),
        current_city: Some("Pune".to_string()),
        current_category: Some("dental clinic".to_string()),
    }
}

pub fn lead(run_id: &str, name: &str, category: &str, score: f64) -> Lead {
    Lead {
        country: "India".to_string(),
        city: "Pune".to_string(),
        category: category.to_string(),
        business_name: name.to_string(),
        phone: "+91 20 5555 0101".to_string(),
        rating: Rating::Score(3.8),
        review_count: 27,
        lead_score: score,
        run_id: run_id.to_string(),
        timestamp: "2026-10-15T10:00:00".to_string(),
        ..Lead::default()
    }
}

/// How the mock answers a start or stop command.
#[derive(Debug, Clone)]
pub enum CommandBehavior {
    Accept,
    Reject(Option<String>),
    Fail { status: u16, detail: String },
}

/// In-memory backend with scripted answers and call accounting.
pub struct MockBackend {
    scripted: Mutex<VecDeque<DiscoveryStatus>>,
    current: Mutex<DiscoveryStatus>,
    leads: Mutex<HashMap<String, Vec<Lead>>>,
    countries: Mutex<Option<Vec<String>>>,
    categories: Mutex<Option<Vec<String>>>,
    cities: Mutex<HashMap<String, CityTiers>>,
    stats: Mutex<LeadStats>,
    start_behavior: Mutex<CommandBehavior>,
    stop_behavior: Mutex<CommandBehavior>,
    status_delay: Mutex<Duration>,
    fail_status: AtomicBool,
    fail_leads: AtomicBool,
    pub start_requests: Mutex<Vec<StartRequest>>,
    pub status_calls: AtomicUsize,
    pub leads_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            current: Mutex::new(idle_status()),
            leads: Mutex::new(HashMap::new()),
            countries: Mutex::new(Some(vec!["India".to_string(), "Germany".to_string()])),
            categories: Mutex::new(Some(Vec::new())),
            cities: Mutex::new(HashMap::new()),
            stats: Mutex::new(LeadStats::default()),
            start_behavior: Mutex::new(CommandBehavior::Accept),
            stop_behavior: Mutex::new(CommandBehavior::Accept),
            status_delay: Mutex::new(Duration::ZERO),
            fail_status: AtomicBool::new(false),
            fail_leads: AtomicBool::new(false),
            start_requests: Mutex::new(Vec::new()),
            status_calls: AtomicUsize::new(0),
            leads_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Status returned once no scripted status is left.
    pub fn set_status(&self, status: DiscoveryStatus) {
        *self.current.lock().unwrap() = status;
    }

    /// Statuses returned in order, one per call, before falling back to the
    /// current status.
    pub fn script_statuses(&self, statuses: Vec<DiscoveryStatus>) {
        self.scripted.lock().unwrap().extend(statuses);
    }

    pub fn set_leads(&self, run_id: &str, leads: Vec<Lead>) {
        self.leads.lock().unwrap().insert(run_id.to_string(), leads);
    }

    pub fn set_countries(&self, countries: Option<Vec<&str>>) {
        *self.countries.lock().unwrap() = countries.map(to_strings);
    }

    pub fn set_categories(&self, categories: Option<Vec<&str>>) {
        *self.categories.lock().unwrap() = categories.map(to_strings);
    }

    pub fn set_cities(&self, country: &str, tiers: CityTiers) {
        self.cities.lock().unwrap().insert(country.to_string(), tiers);
    }

    pub fn set_stats(&self, stats: LeadStats) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn set_start_behavior(&self, behavior: CommandBehavior) {
        *self.start_behavior.lock().unwrap() = behavior;
    }

    pub fn set_stop_behavior(&self, behavior: CommandBehavior) {
        *self.stop_behavior.lock().unwrap() = behavior;
    }

    pub fn set_status_delay(&self, delay: Duration) {
        *self.status_delay.lock().unwrap() = delay;
    }

    pub fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    pub fn fail_leads(&self, fail: bool) {
        self.fail_leads.store(fail, Ordering::SeqCst);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn leads_calls(&self) -> usize {
        self.leads_calls.load(Ordering::SeqCst)
    }

    pub fn last_start_request(&self) -> Option<StartRequest> {
        self.start_requests.lock().unwrap().last().cloned()
    }

    fn command_result(behavior: CommandBehavior) -> Result<bool> {
        match behavior {
            CommandBehavior::Accept => Ok(true),
            CommandBehavior::Reject(_) => Ok(false),
            CommandBehavior::Fail { status, detail } => Err(DiscoveryError::Backend { status, detail }),
        }
    }
}

fn to_strings(items: Vec<&str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

fn unavailable() -> DiscoveryError {
    DiscoveryError::Backend {
        status: 503,
        detail: "Discovery app not initialized".to_string(),
    }
}

#[async_trait]
impl DiscoveryBackend for MockBackend {
    async fn status(&self) -> Result<DiscoveryStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);

        let delay = *self.status_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_status.load(Ordering::SeqCst) {
            return Err(unavailable());
        }

        let scripted = self.scripted.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| self.current.lock().unwrap().clone()))
    }

    async fn start(&self, request: &StartRequest) -> Result<StartResponse> {
        self.start_requests.lock().unwrap().push(request.clone());
        let behavior = self.start_behavior.lock().unwrap().clone();
        let message = match &behavior {
            CommandBehavior::Reject(message) => message.clone(),
            _ => Some("Discovery started".to_string()),
        };
        let success = Self::command_result(behavior)?;
        Ok(StartResponse { success, message })
    }

    async fn stop(&self) -> Result<StopResponse> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.stop_behavior.lock().unwrap().clone();
        let success = Self::command_result(behavior)?;
        Ok(StopResponse { success })
    }

    async fn leads(&self, run_id: &str) -> Result<Vec<Lead>> {
        self.leads_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_leads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.leads.lock().unwrap().get(run_id).cloned().unwrap_or_default())
    }

    async fn countries(&self) -> Result<Vec<String>> {
        self.countries.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        self.categories.lock().unwrap().clone().ok_or_else(unavailable)
    }

    async fn cities(&self, country: &str) -> Result<CityTiers> {
        Ok(self.cities.lock().unwrap().get(country).cloned().unwrap_or_default())
    }

    async fn stats(&self) -> Result<LeadStats> {
        Ok(self.stats.lock().unwrap().clone())
    }
}
