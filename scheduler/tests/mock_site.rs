#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use adapters::{PageDriver, Progress, SiteAdapter, SiteError, SlotHandle};
use async_trait::async_trait;
use corelib::{BookingTask, Reservation};
use parking_lot::Mutex;

pub type ClaimOutcome = Result<Option<String>, SiteError>;

/// Site adapter whose claim results are queued up front. Once the queue is
/// empty every claim reports "not offered".
#[derive(Default)]
pub struct ScriptedSite {
    outcomes: Mutex<VecDeque<ClaimOutcome>>,
    trace: Mutex<Vec<String>>,
    pause: Mutex<Duration>,
    panics: AtomicBool,
    claims: AtomicUsize,
}

impl ScriptedSite {
    pub fn new(outcomes: Vec<ClaimOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    /// Progress lines every claim reports before producing its outcome.
    pub fn with_trace(self, lines: &[&str]) -> Self {
        *self.trace.lock() = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Time every claim spends after reporting its progress lines.
    pub fn with_pause(self, pause: Duration) -> Self {
        *self.pause.lock() = pause;
        self
    }

    /// Every claim panics after reporting its progress lines.
    pub fn panicking(self) -> Self {
        self.panics.store(true, Ordering::SeqCst);
        self
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn selector_timeout() -> SiteError {
        SiteError::timeout("#agrApp4", Duration::from_secs(1))
    }
}

#[async_trait]
impl SiteAdapter for ScriptedSite {
    async fn login(&self, _page: &dyn PageDriver, _id: &str, _secret: &str) -> Result<bool, SiteError> {
        Ok(true)
    }

    async fn is_logged_in(&self, _page: &dyn PageDriver) -> Result<bool, SiteError> {
        Ok(true)
    }

    async fn logout(&self, _page: &dyn PageDriver, _timeout: Duration) -> Result<(), SiteError> {
        Ok(())
    }

    async fn open_reservation_list(&self, _page: &dyn PageDriver) -> Result<(), SiteError> {
        Ok(())
    }

    async fn scrape_reservations(&self, _page: &dyn PageDriver) -> Result<Vec<Reservation>, SiteError> {
        Ok(Vec::new())
    }

    async fn find_time_slot(&self, _page: &dyn PageDriver, _target: &str) -> Result<Option<SlotHandle>, SiteError> {
        Ok(None)
    }

    async fn claim_slot(
        &self,
        _page: &dyn PageDriver,
        _task: &BookingTask,
        progress: &Progress,
    ) -> Result<Option<String>, SiteError> {
        let n = self.claims.fetch_add(1, Ordering::SeqCst) + 1;

        let lines = self.trace.lock().clone();
        for line in lines {
            progress(line);
        }

        let pause = *self.pause.lock();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        if self.panics.load(Ordering::SeqCst) {
            panic!("claim blew up on attempt {n}");
        }
        self.outcomes.lock().pop_front().unwrap_or(Ok(None))
    }
}
