//! CLI module for the Sikati site binary.
//!
//! With no subcommand the binary serves the site. Subcommands operate on the
//! configured backend directly:
//! - `status` - Run the startup checks and print a report
//! - `quotes list` - List stored quote requests
//! - `emergency list` - List stored emergency requests
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::client::{ApiClient, EmergencyRequests, Quotes};
use crate::config::Config;
use crate::models::Choice;
use crate::startup::{self, StartupCheckReport};

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "sikati")]
#[command(
    author,
    version,
    about = "Sikati Solutions staffing site and back-office",
    long_about = None
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sikati.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Skip startup self-checks (for development only)
    #[arg(long)]
    pub skip_checks: bool,

    /// Backend API base URL, overrides `api.base_url`
    #[arg(long, env = "SIKATI_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token for admin listing commands
    #[arg(long, env = "SIKATI_TOKEN")]
    pub token: Option<String>,

    /// Subcommand to run (if none, starts the server)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run startup checks against the configured backend
    Status,

    /// Quote request commands
    #[command(subcommand)]
    Quotes(ListCommands),

    /// Emergency request commands
    #[command(subcommand)]
    Emergency(ListCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// List all records
    List,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

impl Cli {
    /// Load the configuration file and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(&self.config)?;
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
            config.validate()?;
        }
        Ok(config)
    }
}

/// Run a CLI command
pub async fn run_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Status) => cmd_status(cli).await,
        Some(Commands::Quotes(ListCommands::List)) => cmd_quotes_list(cli).await,
        Some(Commands::Emergency(ListCommands::List)) => cmd_emergency_list(cli).await,
        Some(Commands::Config(ConfigCommands::Check)) => cmd_config_check(cli),
        None => {
            // No subcommand means start the server - this is handled in main.rs
            Ok(())
        }
    }
}

fn authed_client(cli: &Cli, config: &Config) -> Result<ApiClient> {
    if cli.token.is_none() {
        anyhow::bail!(
            "Authentication required. Use --token or set SIKATI_TOKEN environment variable."
        );
    }
    Ok(ApiClient::new(&config.api)?.with_token(cli.token.clone()))
}

/// Run the startup checks and print the report
async fn cmd_status(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let api = ApiClient::new(&config.api)?;

    println!("Checking backend at {}...", api.base_url());
    let report = startup::run_startup_checks(&config, &api).await;
    print!("{}", format_report(&report));

    if !report.all_critical_passed {
        anyhow::bail!("Critical checks failed");
    }
    Ok(())
}

fn format_report(report: &StartupCheckReport) -> String {
    let mut out = String::new();
    let status = if report.all_critical_passed {
        "[OK] Healthy"
    } else {
        "[!!] Unhealthy"
    };
    out.push_str("\n=== Sikati Status ===\n\n");
    out.push_str(&format!("Version:    v{}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("Status:     {}\n", status));
    out.push_str(&format!("Summary:    {}\n\n", report.summary));
    out.push_str("Checks:\n");
    for check in &report.checks {
        let icon = if check.passed {
            "[OK]"
        } else if check.critical {
            "[!!]"
        } else {
            "[! ]"
        };
        out.push_str(&format!("  {} {:20} {}\n", icon, check.name, check.message));
        if let Some(details) = &check.details {
            out.push_str(&format!("       {}\n", details));
        }
    }
    out.push('\n');
    out
}

/// List stored quote requests
async fn cmd_quotes_list(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let api = authed_client(cli, &config)?;

    let quotes = api
        .list::<Quotes>()
        .await
        .context("Failed to fetch quote requests")?;

    if quotes.is_empty() {
        println!("No quote requests found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<26}  {:<20}  {:<22}  {:<20}  {:<12}  {:>5}",
        "ID", "CONTACT", "COMPANY", "EVENT", "START", "STAFF"
    );
    println!("{}", "-".repeat(118));

    for quote in &quotes {
        let q = &quote.details;
        println!(
            "{:<26}  {:<20}  {:<22}  {:<20}  {:<12}  {:>5}",
            truncate(&quote.id, 26),
            truncate(&q.contact_name, 20),
            truncate(&q.company_name, 22),
            q.event_type.label(),
            q.start_date,
            q.staff_needed
        );
    }

    println!();
    println!("{} quote request(s)", quotes.len());
    Ok(())
}

/// List stored emergency requests
async fn cmd_emergency_list(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let api = authed_client(cli, &config)?;

    let requests = api
        .list::<EmergencyRequests>()
        .await
        .context("Failed to fetch emergency requests")?;

    if requests.is_empty() {
        println!("No emergency requests found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<26}  {:<20}  {:<26}  {:<20}  {:>5}  {:<18}",
        "ID", "NAME", "URGENCY", "WORK TYPE", "STAFF", "START"
    );
    println!("{}", "-".repeat(126));

    for request in &requests {
        let e = &request.details;
        println!(
            "{:<26}  {:<20}  {:<26}  {:<20}  {:>5}  {:<18}",
            truncate(&request.id, 26),
            truncate(&e.name, 20),
            e.urgency.label(),
            e.work_type.label(),
            e.staff_needed,
            e.start_date_time
        );
    }

    println!();
    println!("{} emergency request(s)", requests.len());
    Ok(())
}

/// Validate the configuration file and print a summary
fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("A default configuration will be used when starting the server.");
        return Ok(());
    }

    match cli.load_config() {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Server:");
            println!("  Host:          {}", config.server.host);
            println!("  Port:          {}", config.server.port);
            println!("  Data Dir:      {}", config.server.data_dir.display());
            println!();
            println!("Backend API:");
            println!("  Base URL:      {}", config.api.base_url);
            println!("  Timeout:       {}s", config.api.timeout_secs);
            println!();
            println!("Session:");
            println!("  Storage File:  {}", config.session_storage_file().display());
            println!("  Storage Key:   {}", config.session.storage_key);
            println!("  Cookie:        {}", config.session.cookie_name);
            println!();
            println!("Cache:");
            match config.cache.stale_after_secs {
                Some(secs) => println!("  Stale After:   {}s", secs),
                None => println!("  Stale After:   never (invalidation only)"),
            }
            println!();

            if config.api.base_url.starts_with("http://")
                && !config.api.base_url.contains("localhost")
                && !config.api.base_url.contains("127.0.0.1")
            {
                println!("Warnings:");
                println!("  [!] Backend API is not using HTTPS - bearer tokens travel in plaintext");
                println!();
            }

            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::startup::CheckResult;

    #[test]
    fn test_status_report_lists_every_check() {
        let report = StartupCheckReport::new(vec![
            CheckResult::fail("api_url", "Backend API URL is invalid", true)
                .with_details("relative URL without a base"),
            CheckResult::fail("backend_reachable", "Backend API is not reachable", false),
        ]);
        let out = format_report(&report);
        assert!(out.contains("[!!] Unhealthy"));
        assert!(out.contains("[!!] api_url"));
        assert!(out.contains("relative URL without a base"));
        assert!(out.contains("[! ] backend_reachable"));
        assert!(out.contains(&report.summary));
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["sikati", "quotes", "list", "--token", "abc"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Quotes(ListCommands::List))));
        assert_eq!(cli.token.as_deref(), Some("abc"));

        let cli = Cli::try_parse_from(["sikati", "-c", "site.toml", "config", "check"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("site.toml"));
        assert!(matches!(cli.command, Some(Commands::Config(ConfigCommands::Check))));
    }

    #[test]
    fn test_no_subcommand_serves() {
        let cli = Cli::try_parse_from(["sikati"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("sikati.toml"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Convention Center Hall B", 10), "Conventi...");
    }
}
