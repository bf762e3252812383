use std::sync::Arc;
use std::time::Duration;

use adapters::{BrowserEngine, PageHandle, SiteAdapter};
use anyhow::Context;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, error, info, instrument, warn};

use crate::types::SessionConfig;

/// The single authenticated browsing context of the process.
///
/// Owns the browser engine, a login page kept alive by a periodic reload and
/// a second page reserved for list queries. Call [`SessionManager::shutdown`]
/// to release the browser; dropping the manager only stops the keep-alive.
pub struct SessionManager {
    engine: Arc<dyn BrowserEngine>,
    site: Arc<dyn SiteAdapter>,
    login_page: PageHandle,
    list_page: PageHandle,
    keepalive: JoinHandle<()>,
    cfg: SessionConfig,
}

impl SessionManager {
    #[instrument(skip_all)]
    pub async fn start(
        engine: Arc<dyn BrowserEngine>,
        site: Arc<dyn SiteAdapter>,
        cfg: SessionConfig,
    ) -> anyhow::Result<Self> {
        let login_page = engine
            .first_page()
            .await
            .context("failed to acquire login page")?;

        let keepalive = tokio::spawn(keepalive_loop(
            Arc::clone(&login_page),
            cfg.keepalive_interval,
        ));

        let list_page = match engine.new_page().await {
            Ok(page) => page,
            Err(e) => {
                keepalive.abort();
                return Err(e).context("failed to open list page");
            }
        };

        info!(
            keepalive_secs = cfg.keepalive_interval.as_secs(),
            "session started"
        );

        Ok(Self {
            engine,
            site,
            login_page,
            list_page,
            keepalive,
            cfg,
        })
    }

    /// Log in on the login page. Any automation failure is logged and
    /// reported as `false`, same as rejected credentials.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, id: &str, secret: &str) -> bool {
        sleep(self.cfg.login_settle).await;

        match self.site.login(self.login_page.as_ref(), id, secret).await {
            Ok(true) => {
                info!("logged in");
                true
            }
            Ok(false) => {
                warn!("login rejected");
                false
            }
            Err(e) => {
                error!(error = %e, "login failed");
                false
            }
        }
    }

    /// Whether the login page currently shows the logout affordance.
    #[instrument(skip(self))]
    pub async fn check_session(&self) -> bool {
        match self.site.is_logged_in(self.login_page.as_ref()).await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(error = %e, "session probe failed");
                false
            }
        }
    }

    /// Best-effort logout. Always returns `true`: a missing logout link or a
    /// timed out click is logged, never reported to the caller.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> bool {
        if let Err(e) = self
            .site
            .logout(self.login_page.as_ref(), self.cfg.logout_timeout)
            .await
        {
            warn!(error = %e, "logout affordance not clicked");
        }
        true
    }

    /// Stop the keep-alive timer and close the browser.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        self.keepalive.abort();
        if let Err(e) = self.engine.close().await {
            warn!(error = %e, "browser close failed");
        }
        info!("session closed");
    }

    pub fn engine(&self) -> Arc<dyn BrowserEngine> {
        Arc::clone(&self.engine)
    }

    pub fn site(&self) -> Arc<dyn SiteAdapter> {
        Arc::clone(&self.site)
    }

    pub fn login_page(&self) -> &PageHandle {
        &self.login_page
    }

    pub fn list_page(&self) -> &PageHandle {
        &self.list_page
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.keepalive.abort();
    }
}

async fn keepalive_loop(page: PageHandle, every: Duration) {
    let mut ticker = interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match page.reload().await {
            Ok(()) => debug!("login page reloaded"),
            Err(e) => warn!(error = %e, "keep-alive reload failed"),
        }
    }
}
