use std::time::Duration;

use super::api::SiteEndpoints;

/// Fixed applicant details typed into every claim form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantProfile {
    pub address: String,
    pub email_user: String,
    pub email_domain: String,
    pub headcount: String,
    pub purpose: String,
}

impl Default for ApplicantProfile {
    fn default() -> Self {
        Self {
            address: "경기도 시흥시 승지로 34".into(),
            email_user: "sulbing".into(),
            email_domain: "kakao.com".into(),
            headcount: "14".into(),
            purpose: "풋살 경기".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub endpoints: SiteEndpoints,
    /// Bound on every selector wait inside the site protocol.
    pub selector_timeout: Duration,
    /// Pause before opening the list or claim page.
    pub settle_delay: Duration,
    pub applicant: ApplicantProfile,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            endpoints: SiteEndpoints::default(),
            selector_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_secs(1),
            applicant: ApplicantProfile::default(),
        }
    }
}
