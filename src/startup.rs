// Startup module - displays banner and module status
//
// Printed once the store and notifier are initialized, so the status
// reflects what actually came up rather than what the config asked for.

use crate::config::{Config, VERSION};
use crate::validation::DomainTables;

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Module status for display
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Print the startup banner and module status
pub fn print_startup(config: &Config, tables: &DomainTables) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}folio{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Portfolio backend: projects feed and contact form{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Modules{RESET}");
    for module in &module_status(config, tables) {
        print_module_status(module);
    }
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Listening on {BOLD}{}{RESET}",
        config.bind_addr
    );
    if !config.email.is_configured() {
        println!(
            "  {YELLOW}▸{RESET} {YELLOW}Email notifications off{RESET} {DIM}(missing {}){RESET}",
            config.email.missing().join(", ")
        );
    }
    println!();
}

/// Mirror of the banner for the log stream
pub fn log_startup(config: &Config, tables: &DomainTables) {
    tracing::info!("folio v{} starting", VERSION);
    for module in &module_status(config, tables) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, module.name, module.description);
    }
    tracing::info!("▸ Listening on {}", config.bind_addr);
}

fn module_status(config: &Config, tables: &DomainTables) -> Vec<ModuleStatus> {
    let tables_source = match &config.tables_path {
        Some(path) => path.display().to_string(),
        None => "built-in".to_string(),
    };

    vec![
        ModuleStatus {
            name: "server",
            enabled: true,
            description: "HTTP API".to_string(),
        },
        ModuleStatus {
            name: "validator",
            enabled: true,
            description: format!("{} ({})", tables.summary(), tables_source),
        },
        ModuleStatus {
            name: "store",
            enabled: true,
            description: format!("SQLite {}", config.db_path.display()),
        },
        ModuleStatus {
            name: "email",
            enabled: config.email.is_configured(),
            description: if config.email.is_configured() {
                "EmailJS notifications".to_string()
            } else {
                "not configured".to_string()
            },
        },
    ]
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_module_tracks_configuration() {
        let mut config = Config::default();
        let tables = DomainTables::default();

        let status = module_status(&config, &tables);
        let email = status.iter().find(|m| m.name == "email").unwrap();
        assert!(!email.enabled);

        config.email.service_id = Some("s".into());
        config.email.template_id = Some("t".into());
        config.email.user_id = Some("u".into());
        let status = module_status(&config, &tables);
        let email = status.iter().find(|m| m.name == "email").unwrap();
        assert!(email.enabled);
    }

    #[test]
    fn validator_reports_table_source() {
        let mut config = Config::default();
        config.tables_path = Some("/tmp/domains.toml".into());
        let status = module_status(&config, &DomainTables::default());
        let validator = status.iter().find(|m| m.name == "validator").unwrap();
        assert!(validator.description.contains("/tmp/domains.toml"));
    }
}
