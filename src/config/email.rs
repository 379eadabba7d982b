//! Email notification configuration
//!
//! The three service identifiers are usually secrets kept out of the config
//! file, so each one can come from an environment variable instead.

use serde::Deserialize;

pub const ENV_SERVICE_ID: &str = "EMAILJS_SERVICE_ID";
pub const ENV_TEMPLATE_ID: &str = "EMAILJS_TEMPLATE_ID";
pub const ENV_USER_ID: &str = "EMAILJS_USER_ID";
pub const ENV_API_URL: &str = "EMAILJS_API_URL";

const DEFAULT_API_URL: &str = "https://api.emailjs.com";

/// Email dispatch settings
#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    /// Public key of the sending account
    pub user_id: Option<String>,
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            service_id: None,
            template_id: None,
            user_id: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

/// `[email]` section as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileEmail {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub user_id: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl EmailConfig {
    /// Env vars take precedence over the file section
    pub fn from_file(file: Option<FileEmail>, env: impl Fn(&str) -> Option<String>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            service_id: env(ENV_SERVICE_ID).or(file.service_id),
            template_id: env(ENV_TEMPLATE_ID).or(file.template_id),
            user_id: env(ENV_USER_ID).or(file.user_id),
            api_url: env(ENV_API_URL)
                .or(file.api_url)
                .unwrap_or(defaults.api_url),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }

    /// Names of the identifiers that are unset or blank
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (ENV_SERVICE_ID, &self.service_id),
            (ENV_TEMPLATE_ID, &self.template_id),
            (ENV_USER_ID, &self.user_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_configured(&self) -> bool {
        self.missing().is_empty()
    }
}
