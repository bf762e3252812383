//! The booking retry loop.
//!
//! For each run it:
//!   1. Resets the task's target and log, marks it Running and prepares its page.
//!   2. Loops until the task is no longer Running: checks the eligibility
//!      window, attempts a claim when eligible, records the outcome, backs off.
//!   3. Marks the task Stopped.
//!
//! A successful claim does not end the loop. Only a stop request does.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use adapters::{DialogPolicy, PageHandle, ResourceKind, SiteAdapter};
use common::logger::{task_span, warn_if_slow};
use corelib::{BookingTask, TaskId, TaskStatus};
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{Instrument, Span, debug, error, info, warn};

use super::clock::Clock;
use super::eligibility::check_date_eligibility;
use super::registry::TaskRegistry;
use super::types::SchedulerConfig;

const SLOW_CLAIM: Duration = Duration::from_secs(10);

pub struct BookingScheduler {
    registry: Arc<TaskRegistry>,
    site: Arc<dyn SiteAdapter>,
    clock: Arc<dyn Clock>,
    cfg: SchedulerConfig,
}

impl BookingScheduler {
    pub fn new(
        registry: Arc<TaskRegistry>,
        site: Arc<dyn SiteAdapter>,
        clock: Arc<dyn Clock>,
        cfg: SchedulerConfig,
    ) -> Self {
        Self {
            registry,
            site,
            clock,
            cfg,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Run `request`'s loop on its own tokio task.
    pub fn spawn(self: &Arc<Self>, request: BookingTask) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(&request).await })
    }

    /// Drive the retry loop for a task already known to the registry, using
    /// `request`'s date and time. Returns once the task has been stopped or
    /// removed.
    pub async fn run(&self, request: &BookingTask) {
        let span = task_span(
            &request.id.to_string(),
            &request.space_no,
            &request.date_str(),
        );
        self.run_inner(request).instrument(span).await
    }

    async fn run_inner(&self, request: &BookingTask) {
        let id = request.id;

        let Some(page) = self.registry.page(id) else {
            warn!("run requested for unknown task");
            return;
        };

        self.registry.modify(id, |t| {
            t.date = request.date;
            t.time = request.time.clone();
            t.attempts = 0;
            t.log.clear();
            t.status = TaskStatus::Running;
        });
        self.prepare_page(&page).await;
        info!("booking loop started");

        loop {
            if !self.is_running(id) {
                break;
            }
            self.iterate(id, &page).await;
            self.registry.notify();
        }

        self.registry.modify(id, |t| {
            t.status = TaskStatus::Stopped;
            t.push_log("중단");
        });
        self.registry.notify();
        info!("booking loop stopped");

        sleep(self.cfg.final_delay).await;
    }

    async fn prepare_page(&self, page: &PageHandle) {
        if let Err(e) = page.block_resources(&ResourceKind::HEAVY).await {
            warn!(error = %e, "resource blocking unavailable");
        }
        let policy = DialogPolicy::accept_all(self.cfg.dialog_accept_delay);
        if let Err(e) = page.set_dialog_policy(policy).await {
            warn!(error = %e, "dialog auto-accept unavailable");
        }
    }

    /// A task that disappeared from the registry counts as stopped.
    fn is_running(&self, id: TaskId) -> bool {
        self.registry
            .get(id)
            .is_some_and(|t| t.is_running())
    }

    async fn iterate(&self, id: TaskId, page: &PageHandle) {
        let Some(task) = self.registry.modify(id, |t| {
            t.attempts += 1;
            t.push_log(format!("[{}]회 실행", t.attempts));
            t.clone()
        }) else {
            return;
        };
        Span::current().record("attempt", task.attempts);
        self.registry.notify();

        let today = self.clock.today();
        if !check_date_eligibility(today, task.date).is_eligible() {
            debug!(%today, "target date outside bookable window");
            self.registry.modify(id, |t| {
                t.push_log(format!("{} 은 예약가능한 시간이 아닙니다.", t.slot_label()));
            });
            sleep(self.cfg.backoff).await;
            return;
        }

        // Progress goes straight into the task log so observers see each step.
        let registry = Arc::clone(&self.registry);
        let progress = move |line: String| {
            registry.modify(id, |t| t.push_log(line));
        };
        let claim = self.site.claim_slot(page.as_ref(), &task, &progress);
        let outcome = warn_if_slow(
            "claim_slot",
            SLOW_CLAIM,
            AssertUnwindSafe(claim).catch_unwind(),
        )
        .await;

        let line = match outcome {
            Ok(Ok(Some(label))) => {
                info!(%label, "slot claimed");
                format!("결과: {label}")
            }
            Ok(Ok(None)) => {
                debug!("slot not offered");
                "결과: 없음".to_string()
            }
            Ok(Err(e)) => {
                error!(error = %e, "claim attempt failed");
                format!("에러: {e}")
            }
            Err(payload) => {
                let msg = panic_message(&*payload);
                error!(panic = %msg, "claim attempt panicked");
                format!("에러: {msg}")
            }
        };

        self.registry.modify(id, |t| t.push_log(line));

        sleep(self.cfg.backoff).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic in claim attempt".to_string())
}
