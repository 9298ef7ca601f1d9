//! Invite links.

use serde::Serialize;

use crate::config::InviteConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteLink {
    pub url: String,
    pub referral_code: String,
}

impl InviteLink {
    /// `base_url?start=<code>`, or `&start=` if the base already has a query.
    pub fn from_config(config: &InviteConfig) -> Self {
        let separator = if config.base_url.contains('?') { '&' } else { '?' };
        Self {
            url: format!("{}{separator}start={}", config.base_url, config.referral_code),
            referral_code: config.referral_code.clone(),
        }
    }
}
