use async_trait::async_trait;
use shared::{
    domain::Sector,
    protocol::{CompanyFilterRequest, CompanyPage},
};
use tracing::warn;

pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod orchestrator;
pub mod query;
pub mod request;
pub mod session;
pub mod token;
pub mod transport;
pub mod url_sync;
pub mod validation;

pub use controller::{FilterForm, ListController, ListDependencies, ListSnapshot};
pub use error::ClientError;
pub use orchestrator::{FetchOrchestrator, FetchState, Pagination, ResultSet, SettleOutcome};
pub use query::{QueryParams, PAGE_SIZE};
pub use session::{SessionStore, User};
pub use transport::ApiClient;

/// Source of the filtered company listing.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn filter_companies(
        &self,
        request: CompanyFilterRequest,
    ) -> Result<CompanyPage, ClientError>;
}

/// Source of the sector choices offered by the listing's filter form.
#[async_trait]
pub trait SectorDirectory: Send + Sync {
    async fn fetch_sectors(&self) -> Result<Vec<Sector>, ClientError>;
}

/// Surfaces failures the user should hear about. The listing keeps running
/// after any of them.
pub trait Notifier: Send + Sync {
    fn fetch_failed(&self, err: &ClientError);
}

pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn fetch_failed(&self, err: &ClientError) {
        warn!("companies: fetch failed, keeping previous results: {err}");
    }
}
