use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::element::Element;
use futures::StreamExt;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::browser::{DialogPolicy, PageDriver, ResourceKind};
use crate::error::SiteError;

const POLL_EVERY: Duration = Duration::from_millis(100);

impl ResourceKind {
    fn cdp(self) -> ResourceType {
        match self {
            ResourceKind::Stylesheet => ResourceType::Stylesheet,
            ResourceKind::Font => ResourceType::Font,
            ResourceKind::Image => ResourceType::Image,
        }
    }
}

/// [`PageDriver`] over one chromiumoxide tab.
///
/// Dialog and request-interception listeners are spawned at most once per
/// page and aborted when the page is closed or dropped.
pub struct ChromePage {
    page: Page,
    dialog_policy: Arc<Mutex<Option<DialogPolicy>>>,
    dialog_task: Mutex<Option<JoinHandle<()>>>,
    intercept_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            dialog_policy: Arc::new(Mutex::new(None)),
            dialog_task: Mutex::new(None),
            intercept_task: Mutex::new(None),
        }
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<Element, SiteError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(el) => return Ok(el),
                Err(_) if Instant::now() < deadline => sleep(POLL_EVERY).await,
                Err(_) => return Err(SiteError::timeout(selector, timeout)),
            }
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, SiteError> {
        let result = self.page.evaluate(script).await?;
        Ok(result.into_value::<T>()?)
    }

    fn abort_listeners(&self) {
        if let Some(t) = self.dialog_task.lock().take() {
            t.abort();
        }
        if let Some(t) = self.intercept_task.lock().take() {
            t.abort();
        }
    }
}

/// Quote a string as a JS literal.
fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), SiteError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| SiteError::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn reload(&self) -> Result<(), SiteError> {
        self.page
            .reload()
            .await
            .map_err(|e| SiteError::Navigation(format!("reload: {e}")))?;
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), SiteError> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| SiteError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), SiteError> {
        self.wait_for_element(selector, timeout).await?.click().await?;
        Ok(())
    }

    async fn type_text(
        &self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), SiteError> {
        let el = self.wait_for_element(selector, timeout).await?;
        el.click().await?.type_str(text).await?;
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str, timeout: Duration) -> Result<(), SiteError> {
        self.wait_for_element(selector, timeout)
            .await?
            .press_key(key)
            .await?;
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), SiteError> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.value = {}; return true; }})()",
            js_str(selector),
            js_str(value)
        );
        if self.eval::<bool>(script).await? {
            Ok(())
        } else {
            Err(SiteError::ElementNotFound(selector.to_string()))
        }
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, SiteError> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(e => e.textContent ?? '')",
            js_str(selector)
        );
        self.eval(script).await
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), SiteError> {
        let elements = self.page.find_elements(selector).await?;
        let el = elements
            .get(index)
            .ok_or_else(|| SiteError::ElementNotFound(format!("{selector}[{index}]")))?;
        el.click().await?;
        Ok(())
    }

    async fn has_xpath(&self, xpath: &str) -> Result<bool, SiteError> {
        match self.page.find_xpaths(xpath).await {
            Ok(found) => Ok(!found.is_empty()),
            Err(e) => {
                debug!(error = %e, xpath, "xpath lookup failed");
                Ok(false)
            }
        }
    }

    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<(), SiteError> {
        let deadline = Instant::now() + timeout;
        let el = loop {
            match self.page.find_xpath(xpath).await {
                Ok(el) => break el,
                Err(_) if Instant::now() < deadline => sleep(POLL_EVERY).await,
                Err(_) => return Err(SiteError::timeout(xpath, timeout)),
            }
        };
        el.click().await?;
        Ok(())
    }

    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<Option<String>>>, SiteError> {
        let script = format!(
            "Array.from(document.querySelectorAll({})).map(r => Array.from(r.querySelectorAll('td')).map(c => c.textContent))",
            js_str(row_selector)
        );
        self.eval(script).await
    }

    async fn wait_for_ok_response(&self, timeout: Duration) -> Result<(), SiteError> {
        let mut responses = self.page.event_listener::<EventResponseReceived>().await?;
        let found = tokio::time::timeout(timeout, async {
            while let Some(ev) = responses.next().await {
                if ev.response.status == 200 {
                    return true;
                }
            }
            false
        })
        .await
        .map_err(|_| SiteError::timeout("response 200", timeout))?;

        if found { Ok(()) } else { Err(SiteError::Closed) }
    }

    async fn wait_for_js(&self, predicate: &str, timeout: Duration) -> Result<(), SiteError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>(format!("!!({predicate})")).await.unwrap_or(false) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SiteError::timeout(predicate, timeout));
            }
            sleep(POLL_EVERY).await;
        }
    }

    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), SiteError> {
        if self.intercept_task.lock().is_some() {
            return Ok(());
        }

        let blocked: Vec<ResourceType> = kinds.iter().map(|k| k.cdp()).collect();
        let mut paused = self.page.event_listener::<EventRequestPaused>().await?;
        self.page.execute(EnableParams::default()).await?;

        let page = self.page.clone();
        let task = tokio::spawn(async move {
            while let Some(ev) = paused.next().await {
                let res = if blocked.contains(&ev.resource_type) {
                    page.execute(FailRequestParams::new(
                        ev.request_id.clone(),
                        ErrorReason::BlockedByClient,
                    ))
                    .await
                    .map(|_| ())
                } else {
                    page.execute(ContinueRequestParams::new(ev.request_id.clone()))
                        .await
                        .map(|_| ())
                };
                if let Err(e) = res {
                    debug!(error = %e, "request interception reply failed");
                }
            }
        });

        *self.intercept_task.lock() = Some(task);
        Ok(())
    }

    async fn set_dialog_policy(&self, policy: DialogPolicy) -> Result<(), SiteError> {
        *self.dialog_policy.lock() = Some(policy);

        if self.dialog_task.lock().is_some() {
            return Ok(());
        }

        let mut dialogs = self
            .page
            .event_listener::<EventJavascriptDialogOpening>()
            .await?;
        let page = self.page.clone();
        let policy = Arc::clone(&self.dialog_policy);

        let task = tokio::spawn(async move {
            while let Some(ev) = dialogs.next().await {
                let current = policy.lock().clone();
                let Some(current) = current else { continue };
                if !current.matches(&ev.message) {
                    debug!(message = %ev.message, "dialog left for the page");
                    continue;
                }

                sleep(current.accept_after).await;
                if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                    warn!(error = %e, "failed to accept dialog");
                }
            }
        });

        *self.dialog_task.lock() = Some(task);
        Ok(())
    }

    async fn close(&self) -> Result<(), SiteError> {
        self.abort_listeners();
        self.page.clone().close().await?;
        Ok(())
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        self.abort_listeners();
    }
}
