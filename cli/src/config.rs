use std::path::PathBuf;
use std::time::Duration;

use adapters::chrome::ChromeConfig;
use adapters::siso::{SiteConfig, SiteEndpoints};
use scheduler::SchedulerConfig;
use session::SessionConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Browser binary; auto-detected when unset.
    pub chrome: Option<PathBuf>,
    pub headless: bool,

    /// Database holding the reservation cache.
    pub database_url: String,

    /// Base URL of the booking site.
    pub site_host: String,

    /// Login-page reload period, in seconds.
    pub keepalive_secs: u64,

    /// Pause between booking attempts, in milliseconds.
    pub backoff_ms: u64,

    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let chrome = var("BOOKER_CHROME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            chrome,
            headless: flag(var("BOOKER_HEADLESS"), true),
            database_url: var("BOOKER_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://booker.db?mode=rwc".to_string()),
            site_host: var("BOOKER_SITE_HOST")
                .unwrap_or_else(|| adapters::siso::api::DEFAULT_HOST.to_string()),
            keepalive_secs: number(var("BOOKER_KEEPALIVE_SECS"), 300),
            backoff_ms: number(var("BOOKER_BACKOFF_MS"), 1_000),
            json_logs: flag(var("BOOKER_JSON_LOGS"), false),
        }
    }

    pub fn chrome_config(&self) -> ChromeConfig {
        ChromeConfig {
            executable: self.chrome.clone(),
            headless: self.headless,
            ..ChromeConfig::default()
        }
    }

    pub fn site_config(&self) -> anyhow::Result<SiteConfig> {
        Ok(SiteConfig {
            endpoints: SiteEndpoints::new(self.site_host.as_str())?,
            ..SiteConfig::default()
        })
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            keepalive_interval: Duration::from_secs(self.keepalive_secs),
            ..SessionConfig::default()
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            backoff: Duration::from_millis(self.backoff_ms),
            ..SchedulerConfig::default()
        }
    }
}

/// "0", "false", "no" and "off" are false; any other value is true.
fn flag(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => {
            let lower = v.trim().to_ascii_lowercase();
            !matches!(lower.as_str(), "0" | "false" | "no" | "off")
        }
        None => default,
    }
}

fn number(value: Option<String>, default: u64) -> u64 {
    match value.map(|v| v.trim().parse::<u64>()) {
        Some(Ok(n)) if n > 0 => n,
        Some(_) => {
            tracing::warn!(default, "ignoring invalid numeric setting");
            default
        }
        None => default,
    }
}
