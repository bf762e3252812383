use url::Url;

use crate::error::SiteError;

pub const DEFAULT_HOST: &str = "https://share.siheung.go.kr";

const LOGIN_PATH: &str = "/login.do";
const LIST_PATH: &str = "/mypage/receipt_list.do";
const CLAIM_PATH: &str = "/space/receipt_agree.do";

/// URL builder for the site's logical endpoints.
#[derive(Debug, Clone)]
pub struct SiteEndpoints {
    host: String,
}

impl SiteEndpoints {
    pub fn new(host: impl Into<String>) -> Result<Self, SiteError> {
        let host = host.into();
        Url::parse(&host)?;
        Ok(Self { host })
    }

    pub fn login_url(&self) -> Result<Url, SiteError> {
        self.build(LOGIN_PATH, &[("key", "701000")])
    }

    pub fn list_url(&self) -> Result<Url, SiteError> {
        self.build(LIST_PATH, &[("key", "802000")])
    }

    /// Claim form for one space on one day. `use_date` is `YYYY-MM-DD`.
    pub fn claim_url(&self, use_date: &str, space_no: &str) -> Result<Url, SiteError> {
        self.build(
            CLAIM_PATH,
            &[
                ("searchCategory", "3"),
                ("searchDetailCategory", "38"),
                ("searchCondition", "title"),
                ("pageIndex", "2"),
                ("key", "206000"),
                ("use_date", use_date),
                ("space_no", space_no),
                ("searchPositonDong", ""),
                ("searchReserve", ""),
            ],
        )
    }

    fn build(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, SiteError> {
        let mut url = Url::parse(&self.host)?.join(path)?;
        url.query_pairs_mut().clear().extend_pairs(params);
        Ok(url)
    }
}

impl Default for SiteEndpoints {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
        }
    }
}
