use std::time::Duration;

use async_trait::async_trait;
use corelib::{BookingTask, Reservation};
use tracing::{debug, info, instrument};

use super::parser::{match_time_slot, parse_rows};
use super::types::SiteConfig;
use super::{Progress, SiteAdapter, SlotHandle};
use crate::browser::{DialogPolicy, PageDriver};
use crate::error::SiteError;

const BAD_LOGIN_MESSAGE: &str = "일치하는 로그인 정보(아이디/암호)가 없습니다";
const LOGOUT_XPATH: &str = "//ul[@class='utility']/li/a[contains(text(), '로그아웃')]";

const MEMBER_TAB: &str = "a#tab2";
const USER_ID_INPUT: &str = r#"input[name="user_id"]"#;
const USER_PW_INPUT: &str = r#"input[name="user_pw"]"#;

const RESERVATION_ROWS: &str = "table.myreservation tbody tr";

const AGREE_CHECKBOX: &str = "#agrApp4";
const SUBMIT_BUTTON: &str = r#"input[type="submit"]"#;
const ADDRESS_INPUT: &str = "input#addr";
const EMAIL_USER_INPUT: &str = "input#email1";
const EMAIL_DOMAIN_INPUT: &str = "input#email2";
const HEADCOUNT_INPUT: &str = "input#use_count";
const PURPOSE_INPUT: &str = "input#use_purpose";
const START_TIME_LINKS: &str = ".sel_startTime_li a";
const FIRST_END_TIME: &str = "#sel_endTime_0";
const CONFIRM_BUTTON: &str = "a.btn_style1";
const ALERT_RAISED: &str = "!!window.alert";

/// Adapter for the Siheung shared-space booking site.
pub struct SisoSite {
    cfg: SiteConfig,
}

impl SisoSite {
    pub fn new(cfg: SiteConfig) -> Self {
        Self { cfg }
    }

    fn timeout(&self) -> Duration {
        self.cfg.selector_timeout
    }

    async fn fill_applicant(&self, page: &dyn PageDriver) -> Result<(), SiteError> {
        let a = &self.cfg.applicant;
        page.type_text(ADDRESS_INPUT, &a.address, self.timeout()).await?;
        page.type_text(EMAIL_USER_INPUT, &a.email_user, self.timeout()).await?;
        page.type_text(EMAIL_DOMAIN_INPUT, &a.email_domain, self.timeout()).await?;
        page.set_value(HEADCOUNT_INPUT, &a.headcount).await?;
        page.type_text(PURPOSE_INPUT, &a.purpose, self.timeout()).await?;
        Ok(())
    }
}

impl Default for SisoSite {
    fn default() -> Self {
        Self::new(SiteConfig::default())
    }
}

#[async_trait]
impl SiteAdapter for SisoSite {
    #[instrument(skip(self, page, secret))]
    async fn login(
        &self,
        page: &dyn PageDriver,
        id: &str,
        secret: &str,
    ) -> Result<bool, SiteError> {
        let url = self.cfg.endpoints.login_url()?;
        page.goto(url.as_str()).await?;
        page.set_dialog_policy(DialogPolicy::accept_message(BAD_LOGIN_MESSAGE))
            .await?;

        page.click(MEMBER_TAB, self.timeout()).await?;
        page.type_text(USER_ID_INPUT, id, self.timeout()).await?;
        page.type_text(USER_PW_INPUT, secret, self.timeout()).await?;
        page.press_key(USER_PW_INPUT, "Enter", self.timeout()).await?;
        page.wait_for_navigation().await?;

        let ok = self.is_logged_in(page).await?;
        info!(logged_in = ok, "login submitted");
        Ok(ok)
    }

    async fn is_logged_in(&self, page: &dyn PageDriver) -> Result<bool, SiteError> {
        page.has_xpath(LOGOUT_XPATH).await
    }

    async fn logout(&self, page: &dyn PageDriver, timeout: Duration) -> Result<(), SiteError> {
        page.click_xpath(LOGOUT_XPATH, timeout).await
    }

    #[instrument(skip(self, page))]
    async fn open_reservation_list(&self, page: &dyn PageDriver) -> Result<(), SiteError> {
        tokio::time::sleep(self.cfg.settle_delay).await;
        let url = self.cfg.endpoints.list_url()?;
        page.goto(url.as_str()).await
    }

    async fn scrape_reservations(
        &self,
        page: &dyn PageDriver,
    ) -> Result<Vec<Reservation>, SiteError> {
        let rows = page.table_rows(RESERVATION_ROWS).await?;
        debug!(rows = rows.len(), "reservation rows scraped");
        Ok(parse_rows(rows))
    }

    async fn find_time_slot(
        &self,
        page: &dyn PageDriver,
        target: &str,
    ) -> Result<Option<SlotHandle>, SiteError> {
        let links = page.texts(START_TIME_LINKS).await?;
        Ok(match_time_slot(&links, target))
    }

    #[instrument(skip_all, fields(task_id = %task.id, slot = %task.slot_label()))]
    async fn claim_slot(
        &self,
        page: &dyn PageDriver,
        task: &BookingTask,
        progress: &Progress,
    ) -> Result<Option<String>, SiteError> {
        tokio::time::sleep(self.cfg.settle_delay).await;

        let url = self.cfg.endpoints.claim_url(&task.date_str(), &task.space_no)?;
        page.goto(url.as_str()).await?;
        progress(format!("진행중: 사이트 접속 ({url})"));

        page.click(AGREE_CHECKBOX, self.timeout()).await?;
        page.click(SUBMIT_BUTTON, self.timeout()).await?;
        progress("진행중: 준수사항 동의".into());
        page.wait_for_ok_response(self.timeout()).await?;

        self.fill_applicant(page).await?;
        progress("진행중: 예약 등록사항 입력".into());

        let Some(slot) = self.find_time_slot(page, &task.time).await? else {
            debug!("target time not offered");
            return Ok(None);
        };

        page.click_nth(START_TIME_LINKS, slot.index).await?;
        page.click(FIRST_END_TIME, self.timeout()).await?;
        page.click(CONFIRM_BUTTON, self.timeout()).await?;
        page.wait_for_js(ALERT_RAISED, self.timeout()).await?;

        progress("진행중: 예약 완료".into());
        info!(slot = %slot.label, "slot claimed");
        Ok(Some(task.slot_label()))
    }
}
