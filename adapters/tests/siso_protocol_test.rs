use std::sync::Arc;
use std::time::Duration;

use adapters::fake::FakePage;
use adapters::siso::{SiteConfig, SiteEndpoints, SisoSite};
use adapters::{SiteAdapter, SiteError};
use chrono::NaiveDate;
use corelib::BookingTask;
use parking_lot::Mutex;

const LOGOUT_XPATH: &str = "//ul[@class='utility']/li/a[contains(text(), '로그아웃')]";
const START_TIMES: &str = ".sel_startTime_li a";

fn site() -> SisoSite {
    SisoSite::new(SiteConfig {
        endpoints: SiteEndpoints::new("https://booking.test").unwrap(),
        ..SiteConfig::default()
    })
}

/// Collects progress lines in emission order.
#[derive(Default)]
struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    fn sink(&self) -> impl Fn(String) + Send + Sync + 'static {
        let buf = Arc::clone(&self.0);
        move |line| buf.lock().push(line)
    }

    fn lines(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn task() -> BookingTask {
    BookingTask::new("57", NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(), "10:00")
}

#[tokio::test(start_paused = true)]
async fn login_succeeds_when_logout_link_appears() {
    let page = FakePage::new();
    page.reveal_on_navigation(LOGOUT_XPATH);

    let ok = site().login(&page, "user", "pw").await.unwrap();
    assert!(ok);

    let journal = page.journal();
    assert_eq!(journal[0], "goto https://booking.test/login.do?key=701000");
    assert!(journal.contains(&"click a#tab2".to_string()));
    assert!(journal.contains(&r#"type input[name="user_id"] user"#.to_string()));
    assert!(journal.contains(&r#"type input[name="user_pw"] pw"#.to_string()));
    assert!(journal.contains(&r#"press input[name="user_pw"] Enter"#.to_string()));

    let policy = page.dialog_policy().unwrap();
    assert!(policy.matches("일치하는 로그인 정보(아이디/암호)가 없습니다"));
    assert!(!policy.matches("다른 알림"));
}

#[tokio::test(start_paused = true)]
async fn rejected_credentials_return_false() {
    let page = FakePage::new();
    assert!(!site().login(&page, "user", "wrong").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn login_surfaces_missing_member_tab() {
    let page = FakePage::new();
    page.remove_selector("a#tab2");

    let err = site().login(&page, "user", "pw").await.unwrap_err();
    assert!(matches!(err, SiteError::Timeout { .. }));
}

#[tokio::test]
async fn logout_clicks_affordance_or_times_out() {
    let page = FakePage::new();
    let s = site();

    assert!(s.logout(&page, Duration::from_secs(1)).await.is_err());

    page.add_xpath(LOGOUT_XPATH);
    s.logout(&page, Duration::from_secs(1)).await.unwrap();
    assert_eq!(page.journal().last().unwrap(), &format!("click_xpath {LOGOUT_XPATH}"));
}

#[tokio::test(start_paused = true)]
async fn reservation_list_is_scraped_from_table() {
    let page = FakePage::new();
    page.set_rows(
        "table.myreservation tbody tr",
        vec![
            vec![Some("1".into()), Some(" 풋살장 ".into()), None],
            vec![Some("2".into()), Some("체육관".into()), Some("승인".into())],
        ],
    );

    let s = site();
    s.open_reservation_list(&page).await.unwrap();
    let list = s.scrape_reservations(&page).await.unwrap();

    assert_eq!(
        page.journal()[0],
        "goto https://booking.test/mypage/receipt_list.do?key=802000"
    );
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].columns(), ["1", " 풋살장 ", ""]);
    assert_eq!(list[0].display_columns(), ["1", "풋살장", ""]);
    assert_eq!(list[1].column(2), Some("승인"));
}

#[tokio::test(start_paused = true)]
async fn claim_walks_the_form_and_returns_label() {
    let page = FakePage::new();
    page.set_texts(START_TIMES, &[" 09:00 ", "\n10:00\n", "11:00"]);

    let trace = Trace::default();
    let res = site().claim_slot(&page, &task(), &trace.sink()).await.unwrap();
    let trace = trace.lines();

    assert_eq!(res.as_deref(), Some("2026-12-01 10:00"));
    assert_eq!(trace.len(), 4);
    assert!(trace[0].starts_with("진행중: 사이트 접속 (https://booking.test/space/receipt_agree.do?"));
    assert!(trace[0].contains("use_date=2026-12-01&space_no=57"));
    assert_eq!(trace[3], "진행중: 예약 완료");

    let journal = page.journal();
    let pos = |entry: &str| journal.iter().position(|e| e == entry).unwrap();
    assert!(pos("click #agrApp4") < pos(r#"click input[type="submit"]"#));
    assert!(pos("wait_for_ok_response") < pos("type input#addr 경기도 시흥시 승지로 34"));
    assert!(journal.contains(&"type input#email1 sulbing".to_string()));
    assert!(journal.contains(&"type input#email2 kakao.com".to_string()));
    assert!(journal.contains(&"set input#use_count 14".to_string()));
    assert!(journal.contains(&"type input#use_purpose 풋살 경기".to_string()));
    assert!(pos(&format!("click_nth {START_TIMES} 1")) < pos("click #sel_endTime_0"));
    assert!(pos("click #sel_endTime_0") < pos("click a.btn_style1"));
    assert_eq!(journal.last().unwrap(), "wait_for_js !!window.alert");
}

#[tokio::test(start_paused = true)]
async fn claim_without_matching_time_returns_none() {
    let page = FakePage::new();
    page.set_texts(START_TIMES, &["09:00", "10:00 "]);
    let mut t = task();
    t.time = "12:00".into();

    let trace = Trace::default();
    let res = site().claim_slot(&page, &t, &trace.sink()).await.unwrap();
    let trace = trace.lines();

    assert_eq!(res, None);
    assert_eq!(trace.len(), 3);
    assert!(!page.journal().iter().any(|e| e.starts_with("click_nth")));
}

#[tokio::test(start_paused = true)]
async fn claim_failure_keeps_progress_so_far() {
    let page = FakePage::new();
    page.remove_selector("input#addr");

    let trace = Trace::default();
    let err = site()
        .claim_slot(&page, &task(), &trace.sink())
        .await
        .unwrap_err();
    let trace = trace.lines();

    assert!(matches!(err, SiteError::Timeout { ref target, .. } if target == "input#addr"));
    assert_eq!(trace.len(), 2);
    assert_eq!(trace[1], "진행중: 준수사항 동의");
}
