//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize an optional string as a key, or a commented-out example
    fn optional_key(key: &str, value: Option<&str>, example: &str) -> String {
        match value {
            Some(v) => format!("{} = {:?}\n", key, v),
            None => format!("# {} = {:?}\n", key, example),
        }
    }

    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        let tables_path = self
            .tables_path
            .as_ref()
            .map(|p| p.display().to_string());

        format!(
            r#"# folio configuration

# HTTP bind address
bind_addr = {bind:?}

# SQLite document store (projects + contact messages)
db_path = {db_path:?}

# Shown to visitors when a message cannot be saved
owner_email = {owner_email:?}

# Replace the built-in email domain tables (legitimate, disposable, typos)
{tables_path}
# ─────────────────────────────────────────────────────────────────────────────
# EMAIL NOTIFICATIONS (EmailJS)
# ─────────────────────────────────────────────────────────────────────────────
# All three identifiers are required; if any is missing, messages are still
# saved but no email is sent. Prefer the environment variables
# EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_USER_ID.
[email]
{service_id}{template_id}{user_id}api_url = {api_url:?}
timeout_secs = {timeout_secs}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level:?}
# JSON file logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir:?}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix:?}
"#,
            bind = self.bind_addr.to_string(),
            db_path = self.db_path.display().to_string(),
            owner_email = self.owner_email,
            tables_path = Self::optional_key(
                "tables_path",
                tables_path.as_deref(),
                "./domains.toml"
            ),
            service_id = Self::optional_key(
                "service_id",
                self.email.service_id.as_deref(),
                "service_xxxxxxx"
            ),
            template_id = Self::optional_key(
                "template_id",
                self.email.template_id.as_deref(),
                "template_xxxxxxx"
            ),
            user_id = Self::optional_key(
                "user_id",
                self.email.user_id.as_deref(),
                "your-public-key"
            ),
            api_url = self.email.api_url,
            timeout_secs = self.email.timeout_secs,
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string(),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
