use std::sync::Arc;
use std::time::Duration;

use adapters::PageDriver;
use anyhow::anyhow;
use common::logger::warn_if_slow;
use corelib::{Reservation, ReservationList};
use tracing::{error, info, instrument, warn};

use crate::identity::IdentityProvider;
use crate::manager::SessionManager;
use crate::store::ReservationStore;

const SLOW_SCRAPE: Duration = Duration::from_secs(5);

/// Read-through cache of the current user's existing reservations.
pub struct ReservationListCache {
    session: Arc<SessionManager>,
    store: Arc<dyn ReservationStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl ReservationListCache {
    pub fn new(
        session: Arc<SessionManager>,
        store: Arc<dyn ReservationStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            session,
            store,
            identity,
        }
    }

    /// Cached reservations of the current user, refreshing once when the
    /// user has no entry yet. Any failure yields an empty list.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<Reservation> {
        match self.try_list().await {
            Ok(list) => list,
            Err(e) => {
                error!(error = %e, "reservation list unavailable");
                Vec::new()
            }
        }
    }

    /// Re-scrape the list page and overwrite the current user's entry.
    /// On failure the previous entry is left as it was.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        if let Err(e) = self.try_refresh().await {
            error!(error = %e, "reservation refresh failed");
        }
    }

    async fn try_list(&self) -> anyhow::Result<Vec<Reservation>> {
        let user = self.identity.current_user().await?;

        if !self.store.get().await?.contains_key(&user) {
            self.refresh().await;
        }

        self.store
            .get()
            .await?
            .remove(&user)
            .map(|entry| entry.list)
            .ok_or_else(|| anyhow!("no reservations cached for {user}"))
    }

    async fn try_refresh(&self) -> anyhow::Result<()> {
        let user = self.identity.current_user().await?;
        let mut cache = self.store.get().await?;

        let site = self.session.site();
        let page: &dyn PageDriver = self.session.list_page().as_ref();

        // Scrape whatever loaded even if navigation reported an error.
        if let Err(e) = site.open_reservation_list(page).await {
            warn!(error = %e, "list page navigation failed");
        }

        let list = warn_if_slow(
            "scrape_reservations",
            SLOW_SCRAPE,
            site.scrape_reservations(page),
        )
        .await?;

        info!(user = %user, rows = list.len(), "reservation list refreshed");
        cache.insert(user, ReservationList { list });
        self.store.set(&cache).await
    }
}
