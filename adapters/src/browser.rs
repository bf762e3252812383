//! Browsing-engine abstraction.
//!
//! Everything above this layer talks to pages through [`PageDriver`], so the
//! site protocol, session manager and scheduler run unchanged against
//! Chromium ([`crate::chrome`]) or the in-memory fake ([`crate::fake`]).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SiteError;

/// Shared handle to one browser tab.
pub type PageHandle = Arc<dyn PageDriver>;

/// Sub-resources that can be refused while a page loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Stylesheet,
    Font,
    Image,
}

impl ResourceKind {
    /// Kinds dropped on claim pages: none of them affect the form.
    pub const HEAVY: [ResourceKind; 3] = [
        ResourceKind::Stylesheet,
        ResourceKind::Font,
        ResourceKind::Image,
    ];
}

/// How native `alert`/`confirm` dialogs raised by a page are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogPolicy {
    /// Accept only dialogs with exactly this message. `None` accepts all.
    pub only_message: Option<String>,
    /// Delay before accepting, giving the dialog time to render.
    pub accept_after: Duration,
}

impl DialogPolicy {
    pub fn accept_all(accept_after: Duration) -> Self {
        Self {
            only_message: None,
            accept_after,
        }
    }

    pub fn accept_message(message: impl Into<String>) -> Self {
        Self {
            only_message: Some(message.into()),
            accept_after: Duration::ZERO,
        }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.only_message.as_deref().is_none_or(|m| m == message)
    }
}

/// Page-level automation primitives.
///
/// Methods taking a `timeout` poll for their target and fail with
/// [`SiteError::Timeout`] once it elapses.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), SiteError>;
    async fn reload(&self) -> Result<(), SiteError>;
    async fn wait_for_navigation(&self) -> Result<(), SiteError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), SiteError>;
    async fn type_text(&self, selector: &str, text: &str, timeout: Duration)
    -> Result<(), SiteError>;
    async fn press_key(&self, selector: &str, key: &str, timeout: Duration)
    -> Result<(), SiteError>;
    /// Assign `value` to an input directly, without key events.
    async fn set_value(&self, selector: &str, value: &str) -> Result<(), SiteError>;

    /// Raw `textContent` of every element matching `selector`, in DOM order.
    async fn texts(&self, selector: &str) -> Result<Vec<String>, SiteError>;
    async fn click_nth(&self, selector: &str, index: usize) -> Result<(), SiteError>;

    async fn has_xpath(&self, xpath: &str) -> Result<bool, SiteError>;
    async fn click_xpath(&self, xpath: &str, timeout: Duration) -> Result<(), SiteError>;

    /// `textContent` of each `td` in every row matching `row_selector`.
    async fn table_rows(&self, row_selector: &str) -> Result<Vec<Vec<Option<String>>>, SiteError>;

    async fn wait_for_ok_response(&self, timeout: Duration) -> Result<(), SiteError>;
    async fn wait_for_js(&self, predicate: &str, timeout: Duration) -> Result<(), SiteError>;

    async fn block_resources(&self, kinds: &[ResourceKind]) -> Result<(), SiteError>;
    async fn set_dialog_policy(&self, policy: DialogPolicy) -> Result<(), SiteError>;

    async fn close(&self) -> Result<(), SiteError>;
}

/// One browser instance: a set of pages sharing cookies and session state.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// The tab the browser opened with (created if there is none).
    async fn first_page(&self) -> Result<PageHandle, SiteError>;
    async fn new_page(&self) -> Result<PageHandle, SiteError>;
    async fn close(&self) -> Result<(), SiteError>;
}
