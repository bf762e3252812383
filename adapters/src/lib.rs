pub mod browser;
pub mod chrome;
pub mod error;
pub mod fake;
pub mod siso;

pub use browser::{BrowserEngine, DialogPolicy, PageDriver, PageHandle, ResourceKind};
pub use error::SiteError;
pub use siso::{Progress, SiteAdapter, SlotHandle};
