pub mod api;
pub mod parser;
pub mod provider;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use corelib::{BookingTask, Reservation};

use crate::browser::PageDriver;
use crate::error::SiteError;

pub use api::SiteEndpoints;
pub use provider::SisoSite;
pub use types::{ApplicantProfile, SiteConfig};

/// Receives claim progress lines as each step completes.
pub type Progress = dyn Fn(String) + Send + Sync;

/// A start-time link on the claim form, located by its position among the
/// selectable links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotHandle {
    pub index: usize,
    pub label: String,
}

/// Everything known about the remote booking site's pages.
///
/// Implementations only drive the page they are handed; they hold no
/// session state of their own.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Submit credentials on `page`. `Ok(false)` means the site rejected them.
    async fn login(&self, page: &dyn PageDriver, id: &str, secret: &str)
    -> Result<bool, SiteError>;

    /// Probe the currently loaded document for the logout affordance. Never navigates.
    async fn is_logged_in(&self, page: &dyn PageDriver) -> Result<bool, SiteError>;

    async fn logout(&self, page: &dyn PageDriver, timeout: Duration) -> Result<(), SiteError>;

    async fn open_reservation_list(&self, page: &dyn PageDriver) -> Result<(), SiteError>;

    /// Parse every row of the reservation table currently loaded on `page`.
    async fn scrape_reservations(&self, page: &dyn PageDriver)
    -> Result<Vec<Reservation>, SiteError>;

    /// First start-time link whose trimmed text equals `target`.
    async fn find_time_slot(
        &self,
        page: &dyn PageDriver,
        target: &str,
    ) -> Result<Option<SlotHandle>, SiteError>;

    /// Run the full claim sequence for `task` on `page`.
    ///
    /// Returns the claimed slot label, or `None` when the target time is not
    /// offered on this pass. Each step reports to `progress` as soon as it
    /// completes, so lines emitted before an error are not lost.
    async fn claim_slot(
        &self,
        page: &dyn PageDriver,
        task: &BookingTask,
        progress: &Progress,
    ) -> Result<Option<String>, SiteError>;
}
