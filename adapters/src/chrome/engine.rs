use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::page::ChromePage;
use crate::browser::{BrowserEngine, PageHandle};
use crate::error::SiteError;

#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Browser binary. `None` lets chromiumoxide locate an installed Chrome.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// A launched Chromium process plus the task pumping its CDP connection.
pub struct ChromeEngine {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl ChromeEngine {
    #[instrument(skip(cfg), fields(headless = cfg.headless))]
    pub async fn launch(cfg: &ChromeConfig) -> Result<Self, SiteError> {
        let mut builder = BrowserConfig::builder()
            .window_size(cfg.window_width, cfg.window_height)
            .arg("--start-maximized");

        if !cfg.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &cfg.executable {
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(SiteError::Browser)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        // The connection only makes progress while the handler is polled.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "cdp handler event error");
                }
            }
            debug!("cdp handler finished");
        });

        info!("browser launched");

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

#[async_trait]
impl BrowserEngine for ChromeEngine {
    async fn first_page(&self) -> Result<PageHandle, SiteError> {
        let browser = self.browser.lock().await;
        let page = match browser.pages().await?.into_iter().next() {
            Some(p) => p,
            None => browser.new_page("about:blank").await?,
        };
        Ok(Arc::new(ChromePage::new(page)))
    }

    async fn new_page(&self) -> Result<PageHandle, SiteError> {
        let page = self.browser.lock().await.new_page("about:blank").await?;
        Ok(Arc::new(ChromePage::new(page)))
    }

    #[instrument(skip(self))]
    async fn close(&self) -> Result<(), SiteError> {
        let mut browser = self.browser.lock().await;
        browser.close().await?;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        info!("browser closed");
        Ok(())
    }
}

impl Drop for ChromeEngine {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
