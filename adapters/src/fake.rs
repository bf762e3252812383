//! In-memory browser used by tests across the workspace.
//!
//! A [`FakePage`] serves a scripted document: texts per selector, table rows,
//! xpaths that exist. Every call is appended to a journal that tests assert on.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::browser::{BrowserEngine, DialogPolicy, PageDriver, PageHandle, ResourceKind};
use crate::error::SiteError;

#[derive(Default)]
struct PageState {
    texts: HashMap<String, Vec<String>>,
    rows: HashMap<String, Vec<Vec<Option<String>>>>,
    xpaths: HashSet<String>,
    revealed_on_navigation: HashSet<String>,
    missing: HashSet<String>,
    fail_navigation: bool,
    closed: bool,
    journal: Vec<String>,
    dialog_policy: Option<DialogPolicy>,
    blocked: Vec<ResourceKind>,
}

#[derive(Default)]
pub struct FakePage {
    state: Mutex<PageState>,
    reloads: AtomicUsize,
    closes: AtomicUsize,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_texts(&self, selector: &str, texts: &[&str]) {
        self.state.lock().texts.insert(
            selector.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
    }

    pub fn set_rows(&self, row_selector: &str, rows: Vec<Vec<Option<String>>>) {
        self.state.lock().rows.insert(row_selector.to_string(), rows);
    }

    pub fn add_xpath(&self, xpath: &str) {
        self.state.lock().xpaths.insert(xpath.to_string());
    }

    /// `xpath` starts matching after the next `wait_for_navigation`.
    pub fn reveal_on_navigation(&self, xpath: &str) {
        self.state
            .lock()
            .revealed_on_navigation
            .insert(xpath.to_string());
    }

    /// Waits on `selector` time out and lookups of it fail.
    pub fn remove_selector(&self, selector: &str) {
        self.state.lock().missing.insert(selector.to_string());
    }

    pub fn fail_navigation(&self, fail: bool) {
        self.state.lock().fail_navigation = fail;
    }

    pub fn journal(&self) -> Vec<String> {
        self.state.lock().journal.clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn dialog_policy(&self) -> Option<DialogPolicy> {
        self.state.lock().dialog_policy.clone()
    }

    pub fn blocked(&self) -> Vec<ResourceKind> {
        self.state.lock().blocked.clone()
    }

    /// Record `entry` and fail if the page is closed.
    fn record(&self, entry: String) -> Result<(), SiteError> {
        let mut st = self.state.lock();
        if st.closed {
            return Err(SiteError::Closed);
        }
        st.journal.push(entry);
        Ok(())
    }

    fn require(&self, target: &str, timeout: Duration) -> Result<(), SiteError> {
        if self.state.lock().missing.contains(target) {
            Err(SiteError::timeout(target, timeout))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> Result<(), SiteError> {
        self.record(format!("goto {url}"))?;
        if self.state.lock().fail_navigation {
            return Err(SiteError::Navigation(url.to_string()));
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), SiteError> {
        self.record("reload".into())?;
        self.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn wait_for_navigation(&self) -> Result<(), SiteError> {
        self.record("wait_for_navigation".into())?;
        let mut st = self.state.lock();
        if st.fail_navigation {
            return Err(SiteError::Navigation("navigation did not settle".into()));
        }
        let revealed: Vec<String> = st.revealed_on_navigation.drain().collect();
        st.xpaths.extend(revealed);
        Ok(())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), SiteError> {
        self.require(selector, timeout)?;
        self.record(format!("click {selector}"))
    }

    async fn type_text(&self, selector: &str, text: &str, timeout: Duration) -> Result<(), SiteError> {
        self.require(selector, timeout)?;
        self.record(format!("type {selector} {text}"))
    }

    async fn press_key(&self, selector: &str, key: &str, timeout: Duration) -> Result<(), SiteError> {
        self.require(selector, timeout)?;
        self.record(format!("press {selector} {key}"))
    }

    async fn set_value(&self, selector: &str, value: &str) -> Result<(), SiteError> {
        if self.state.lock().missing.contains(selector) {
            return Err(SiteError::ElementNotFound(selector.to_string()));
        }
        self.record(format!("set {selector} {value}"))
    }

    async fn texts(&self, selector: &str) -> Result<Vec<String>, SiteError> {
        self.record(format!("texts {selector}"))?;
        Ok(self
            .state
            .lock()
            .texts
            .get(selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), SiteError> {
        let len = self
            .state
            .lock()
            .texts
            .get(selector)
            .map_or(0, Vec::len);
        if index >= len {
            return Err(SiteError::ElementNotFound(format!("{selector}[{index}]")));
        }
        self.record(format!("click_nth {selector} {index}"))
    }

    async fn has_xpath(&self, xpath: &str) -> Result<bool, SiteError> {
        self.record(format!("has_xpath {xpath}"))?;
        Ok(self.state.lock().xpaths.contains(xpath))
    }

    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<(), SiteError> {
        if !self.state.lock().xpaths.contains(xpath) {
            return Err(SiteError::timeout(xpath, timeout));
        }
        self.record(format!("click_xpath {xpath}"))
    }

    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<Option<String>>>, SiteError> {
        self.record(format!("table_rows {row_selector}"))?;
        Ok(self
            .state
            .lock()
            .rows
            .get(row_selector)
            .cloned()
            .unwrap_or_default())
    }

    async fn wait_for_ok_response(&self, timeout: Duration) -> Result<(), SiteError> {
        self.require("response 200", timeout)?;
        self.record("wait_for_ok_response".into())
    }

    async fn wait_for_js(&self, predicate: &str, timeout: Duration) -> Result<(), SiteError> {
        self.require(predicate, timeout)?;
        self.record(format!("wait_for_js {predicate}"))
    }

    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), SiteError> {
        self.record("block_resources".into())?;
        self.state.lock().blocked = kinds.to_vec();
        Ok(())
    }

    async fn set_dialog_policy(&self, policy: DialogPolicy) -> Result<(), SiteError> {
        self.record("set_dialog_policy".into())?;
        self.state.lock().dialog_policy = Some(policy);
        Ok(())
    }

    async fn close(&self) -> Result<(), SiteError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        let mut st = self.state.lock();
        st.closed = true;
        st.journal.push("close".into());
        Ok(())
    }
}

/// Hands out [`FakePage`]s and remembers every one it opened.
#[derive(Default)]
pub struct FakeEngine {
    pages: Mutex<Vec<Arc<FakePage>>>,
    fail_new_page: Mutex<bool>,
    closes: AtomicUsize,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every page opened so far, in opening order. The first is the initial tab.
    pub fn pages(&self) -> Vec<Arc<FakePage>> {
        self.pages.lock().clone()
    }

    pub fn page(&self, idx: usize) -> Option<Arc<FakePage>> {
        self.pages.lock().get(idx).cloned()
    }

    pub fn pages_opened(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn fail_new_page(&self, fail: bool) {
        *self.fail_new_page.lock() = fail;
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    fn open(&self) -> Arc<FakePage> {
        let page = Arc::new(FakePage::new());
        self.pages.lock().push(Arc::clone(&page));
        page
    }
}

#[async_trait]
impl BrowserEngine for FakeEngine {
    async fn first_page(&self) -> Result<PageHandle, SiteError> {
        let existing = self.pages.lock().first().cloned();
        let page = match existing {
            Some(p) => p,
            None => self.open(),
        };
        Ok(page)
    }

    async fn new_page(&self) -> Result<PageHandle, SiteError> {
        if *self.fail_new_page.lock() {
            return Err(SiteError::Browser("cannot open page".into()));
        }
        Ok(self.open())
    }

    async fn close(&self) -> Result<(), SiteError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        for page in self.pages.lock().iter() {
            page.state.lock().closed = true;
        }
        Ok(())
    }
}
