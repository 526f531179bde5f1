//! One client per CIS API. Each module declares its operations as static
//! [`Operation`](crate::options::Operation) descriptions, its result models,
//! and a thin client that feeds them to [`BaseService::invoke`].

use std::time::Duration;

use crate::error::{Error, Result};
use crate::service::BaseService;

pub mod bot_management;
pub mod dns_records;
pub mod ip_list;
pub mod lb_events;
pub mod routing;
pub mod security_events;

/// Base URL shared by the zone-scoped CIS APIs.
pub const CIS_SERVICE_URL: &str = "https://api.cis.cloud.ibm.com";

/// Configuration shared by every module client.
pub trait ServiceClient {
    fn service(&self) -> &BaseService;

    fn service_mut(&mut self) -> &mut BaseService;

    fn service_url(&self) -> &str {
        self.service().service_url()
    }

    fn set_service_url(&mut self, url: &str) -> Result<()> {
        self.service_mut().set_service_url(url)
    }

    fn set_default_headers(&mut self, headers: Vec<(String, String)>) {
        self.service_mut().set_default_headers(headers);
    }

    /// Zero for either argument selects the library default for it.
    fn enable_retries(&mut self, max_retries: u32, max_interval: Duration) {
        self.service_mut().enable_retries(max_retries, max_interval);
    }

    fn disable_retries(&mut self) {
        self.service_mut().disable_retries();
    }
}

/// Reject an empty client identifier.
pub(crate) fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{name} is required")));
    }
    Ok(())
}
