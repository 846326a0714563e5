pub mod types;
pub mod traits;
pub mod client;
pub mod taxonomy;
pub mod classifier;
pub mod selection;
pub mod reference;
pub mod leads;
pub mod poller;
pub mod controller;

pub use types::*;
pub use traits::DiscoveryBackend;
pub use client::HttpBackend;
pub use taxonomy::{CategoryGroup, CategoryTaxonomy, OTHER_GROUP_ID};
pub use classifier::{classify, filter_categories, ClassifiedCategories};
pub use selection::{GroupState, SelectionActions, SelectionSet};
pub use reference::Availability;
pub use leads::{top_counts, LeadFilter, ScoreBand};
pub use poller::{PollPhase, PollSnapshot, PollerMetrics, StatusPoller};
pub use controller::{DiscoverySessionController, View};
