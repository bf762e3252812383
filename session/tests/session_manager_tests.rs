use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use adapters::fake::FakeEngine;
use session::{SessionConfig, SessionManager};

use mock_site::MockSite;

async fn start(site: Arc<MockSite>) -> (Arc<FakeEngine>, SessionManager) {
    let engine = Arc::new(FakeEngine::new());
    let manager = SessionManager::start(engine.clone(), site, SessionConfig::default())
        .await
        .unwrap();
    (engine, manager)
}

#[tokio::test(start_paused = true)]
async fn start_opens_login_and_list_pages() {
    let (engine, manager) = start(Arc::new(MockSite::default())).await;

    assert_eq!(engine.pages_opened(), 2);
    assert!(!Arc::ptr_eq(manager.login_page(), manager.list_page()));
}

#[tokio::test(start_paused = true)]
async fn keepalive_reloads_login_page_every_interval() {
    let (engine, _manager) = start(Arc::new(MockSite::default())).await;
    let login = engine.page(0).unwrap();
    let list = engine.page(1).unwrap();

    tokio::time::sleep(Duration::from_secs(299)).await;
    assert_eq!(login.reloads(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(login.reloads(), 1);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(login.reloads(), 3);
    assert_eq!(list.reloads(), 0);
}

#[tokio::test(start_paused = true)]
async fn login_reports_site_verdict() {
    let site = Arc::new(MockSite::default());
    let (_engine, manager) = start(site.clone()).await;

    assert!(!manager.login("u1", "wrong").await);
    assert!(!manager.check_session().await);

    site.accept_login.store(true, Ordering::SeqCst);
    assert!(manager.login("u1", "pw").await);
    assert!(manager.check_session().await);
}

#[tokio::test(start_paused = true)]
async fn login_automation_failure_is_false_not_error() {
    let site = Arc::new(MockSite::default());
    site.fail_login.store(true, Ordering::SeqCst);
    let (_engine, manager) = start(site.clone()).await;

    assert!(!manager.login("u1", "pw").await);
    assert_eq!(site.logins.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn logout_always_reports_success() {
    let site = Arc::new(MockSite::default());
    let (_engine, manager) = start(site.clone()).await;

    site.fail_logout.store(true, Ordering::SeqCst);
    assert!(manager.logout().await);

    site.fail_logout.store(false, Ordering::SeqCst);
    assert!(manager.logout().await);
    assert_eq!(site.logouts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_keepalive_and_closes_browser() {
    let (engine, manager) = start(Arc::new(MockSite::default())).await;
    let login = engine.page(0).unwrap();

    manager.shutdown().await;
    assert_eq!(engine.closes(), 1);

    tokio::time::sleep(Duration::from_secs(900)).await;
    assert_eq!(login.reloads(), 0);
}

#[tokio::test(start_paused = true)]
async fn start_fails_when_list_page_cannot_open() {
    let engine = Arc::new(FakeEngine::new());
    engine.fail_new_page(true);

    let res = SessionManager::start(
        engine.clone(),
        Arc::new(MockSite::default()),
        SessionConfig::default(),
    )
    .await;

    assert!(res.is_err());
}
