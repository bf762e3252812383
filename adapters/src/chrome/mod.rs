//! Chromium-backed [`BrowserEngine`](crate::BrowserEngine) over the DevTools protocol.

mod engine;
mod page;

pub use engine::{ChromeConfig, ChromeEngine};
pub use page::ChromePage;
