use crate::types::{CityTiers, DiscoveryStatus, Lead, LeadStats, Result, StartRequest, StartResponse, StopResponse};
use async_trait::async_trait;

/// The backend that runs discovery jobs. Everything the session layer knows
/// about a job comes through this trait.
#[async_trait]
pub trait DiscoveryBackend: Send + Sync {
    /// Current job status (`GET /status`)
    async fn status(&self) -> Result<DiscoveryStatus>;

    /// Launch a job (`POST /start`)
    async fn start(&self, request: &StartRequest) -> Result<StartResponse>;

    /// Stop the running job (`POST /stop`)
    async fn stop(&self) -> Result<StopResponse>;

    /// Every lead collected so far for a run (`GET /leads?run_id=`)
    async fn leads(&self, run_id: &str) -> Result<Vec<Lead>>;

    async fn countries(&self) -> Result<Vec<String>>;

    async fn categories(&self) -> Result<Vec<String>>;

    async fn cities(&self, country: &str) -> Result<CityTiers>;

    async fn stats(&self) -> Result<LeadStats>;
}
