mod cli;
mod config;

use std::sync::Arc;

use adapters::chrome::{ChromeConfig, ChromeEngine};
use adapters::siso::SisoSite;
use anyhow::Context;
use clap::Parser;
use common::logger::{TraceId, child_span, init_logger, root_span};
use corelib::{BookingTask, TaskId};
use scheduler::{BookingScheduler, SystemClock, TaskRegistry};
use session::store::SQLiteReservationStore;
use session::store::sqlite_store::DEFAULT_NAMESPACE;
use session::{ReservationListCache, SessionManager, StaticIdentity};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{Instrument, info, warn};

use cli::{Cli, Command, Credentials, ListArgs, RunArgs};
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = AppConfig::from_env();
    cli.apply(&mut cfg);
    init_logger("booker", cfg.json_logs);

    let trace_id = TraceId::default();
    let span = root_span("booker", &trace_id);

    async move {
        match cli.command {
            Command::Run(args) => run(&cfg, args).await,
            Command::List(args) => list(&cfg, args).await,
        }
    }
    .instrument(span)
    .await
}

async fn start_session(cfg: &AppConfig, creds: &Credentials) -> anyhow::Result<SessionManager> {
    let engine = launch(&cfg.chrome_config()).await?;
    let site = Arc::new(SisoSite::new(cfg.site_config()?));
    let session = SessionManager::start(engine, site, cfg.session_config()).await?;

    tracing::Span::current().record("user_id", creds.user.as_str());
    if !session.login(&creds.user, &creds.password).await {
        session.shutdown().await;
        anyhow::bail!("login failed for {}", creds.user);
    }

    Ok(session)
}

async fn launch(cfg: &ChromeConfig) -> anyhow::Result<Arc<ChromeEngine>> {
    let engine = ChromeEngine::launch(cfg)
        .await
        .context("failed to launch browser")?;
    Ok(Arc::new(engine))
}

async fn run(cfg: &AppConfig, args: RunArgs) -> anyhow::Result<()> {
    let session = start_session(cfg, &args.credentials).await?;

    let registry = Arc::new(TaskRegistry::new(session.engine()));
    let scheduler = Arc::new(BookingScheduler::new(
        registry.clone(),
        session.site(),
        Arc::new(SystemClock),
        cfg.scheduler_config(),
    ));

    let task = BookingTask::new(args.space, args.date, args.time);
    let Some(id) = registry.create(task.clone()).await else {
        session.shutdown().await;
        anyhow::bail!("could not open a page for the booking task");
    };

    let printer = tokio::spawn(
        print_progress(registry.subscribe(), id).instrument(child_span("progress")),
    );
    let looping = scheduler.spawn(task);
    info!(task_id = %id, "booking started, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    registry.stop(id);
    if let Err(e) = looping.await {
        warn!(error = %e, "booking loop panicked");
    }
    registry.delete(id).await;
    printer.abort();

    session.logout().await;
    session.shutdown().await;
    Ok(())
}

/// Echo new task-log lines as snapshots arrive.
async fn print_progress(mut rx: broadcast::Receiver<Vec<BookingTask>>, id: TaskId) {
    let mut printed = 0;
    loop {
        let snapshot = match rx.recv().await {
            Ok(s) => s,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "progress updates dropped");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let Some(task) = snapshot.into_iter().find(|t| t.id == id) else {
            continue;
        };
        if task.log.len() < printed {
            printed = 0;
        }
        for line in &task.log[printed..] {
            println!("{line}");
        }
        printed = task.log.len();
    }
}

async fn list(cfg: &AppConfig, args: ListArgs) -> anyhow::Result<()> {
    let store = SQLiteReservationStore::new(&cfg.database_url, DEFAULT_NAMESPACE).await?;
    let session = Arc::new(start_session(cfg, &args.credentials).await?);

    let cache = ReservationListCache::new(
        session.clone(),
        Arc::new(store),
        Arc::new(StaticIdentity::new(args.credentials.user.clone())),
    );

    let reservations = async {
        if args.refresh {
            cache.refresh().await;
        }
        cache.list().await
    }
    .instrument(child_span("list_reservations"))
    .await;

    if reservations.is_empty() {
        println!("no reservations");
    }
    for r in &reservations {
        println!("{}", r.display_columns().join(" | "));
    }

    drop(cache);
    session.logout().await;
    match Arc::try_unwrap(session) {
        Ok(session) => session.shutdown().await,
        Err(_) => warn!("session still shared, browser left to exit with the process"),
    }
    Ok(())
}
