//! Startup self-checks module
//!
//! Verifies the environment before the server starts accepting requests:
//! - The backend API base URL resolves to a valid URL
//! - The session storage directory exists and is writable
//! - The backend answers HTTP at all (non-critical)

use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};

use crate::client::ApiClient;
use crate::config::Config;

/// Result of a single startup check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Whether this check is critical (failure should abort startup)
    pub critical: bool,
    /// Human-readable message describing the result
    pub message: String,
    /// Additional details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            critical: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>, critical: bool) -> Self {
        Self {
            name: name.into(),
            passed: false,
            critical,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Aggregated startup check results
#[derive(Debug, Clone, Serialize)]
pub struct StartupCheckReport {
    pub checks: Vec<CheckResult>,
    /// Whether all critical checks passed
    pub all_critical_passed: bool,
    /// Whether all checks passed (including non-critical)
    pub all_passed: bool,
    pub summary: String,
}

impl StartupCheckReport {
    pub fn new(checks: Vec<CheckResult>) -> Self {
        let all_critical_passed = checks.iter().filter(|c| c.critical).all(|c| c.passed);
        let all_passed = checks.iter().all(|c| c.passed);

        let failed_critical = checks.iter().filter(|c| c.critical && !c.passed).count();
        let failed_non_critical = checks.iter().filter(|c| !c.critical && !c.passed).count();
        let total = checks.len();
        let passed = checks.iter().filter(|c| c.passed).count();

        let summary = if all_passed {
            format!("All {} startup checks passed", total)
        } else if all_critical_passed {
            format!(
                "{}/{} checks passed ({} non-critical warnings)",
                passed, total, failed_non_critical
            )
        } else {
            format!(
                "{}/{} checks passed ({} critical failures)",
                passed, total, failed_critical
            )
        };

        Self {
            checks,
            all_critical_passed,
            all_passed,
            summary,
        }
    }
}

/// Run all startup self-checks
pub async fn run_startup_checks(config: &Config, api: &ApiClient) -> StartupCheckReport {
    info!("Running startup self-checks...");

    let checks = vec![
        check_api_url(config),
        check_storage_writability(&config.session_storage_file()),
        check_backend_reachable(api).await,
    ];

    let report = StartupCheckReport::new(checks);

    for check in &report.checks {
        if check.passed {
            info!(check = %check.name, message = %check.message, "Startup check PASSED");
        } else if check.critical {
            error!(
                check = %check.name,
                message = %check.message,
                details = ?check.details,
                "Startup check FAILED (CRITICAL)"
            );
        } else {
            warn!(
                check = %check.name,
                message = %check.message,
                details = ?check.details,
                "Startup check FAILED (non-critical)"
            );
        }
    }

    info!(
        summary = %report.summary,
        all_passed = report.all_passed,
        all_critical_passed = report.all_critical_passed,
        "Startup checks completed"
    );

    report
}

fn check_api_url(config: &Config) -> CheckResult {
    match config.api.parsed_base_url() {
        Ok(url) => CheckResult::pass("api_url", "Backend API URL is valid")
            .with_details(format!("Base URL: {}", url)),
        Err(e) => CheckResult::fail("api_url", "Backend API URL is invalid", true)
            .with_details(format!("{:#}", e)),
    }
}

/// The session file's directory must accept writes.
fn check_storage_writability(storage_file: &Path) -> CheckResult {
    let dir = match storage_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if let Err(e) = std::fs::create_dir_all(dir) {
        return CheckResult::fail(
            "session_storage",
            "Session storage directory cannot be created",
            true,
        )
        .with_details(format!("{}: {}", dir.display(), e));
    }

    let test_file = dir.join(".sikati_write_test");
    match std::fs::write(&test_file, "test") {
        Ok(_) => {
            let _ = std::fs::remove_file(&test_file);
            CheckResult::pass("session_storage", "Session storage directory is writable")
                .with_details(format!("File: {}", storage_file.display()))
        }
        Err(e) => CheckResult::fail(
            "session_storage",
            "Session storage directory is not writable",
            true,
        )
        .with_details(format!("{}: {}", dir.display(), e)),
    }
}

/// Any HTTP answer counts; only a transport failure fails the check.
pub async fn check_backend_reachable(api: &ApiClient) -> CheckResult {
    match api.probe().await {
        Ok(status) => CheckResult::pass("backend_reachable", "Backend API is reachable")
            .with_details(format!("{} answered {}", api.base_url(), status)),
        Err(e) => CheckResult::fail(
            "backend_reachable",
            "Backend API is not reachable",
            false, // Pages still render; submissions will fail until it is up
        )
        .with_details(e.to_string()),
    }
}

/// Health status served at `/health`
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealthStatus {
    pub healthy: bool,
    pub backend_reachable: bool,
    pub checks: Vec<CheckResult>,
    pub version: String,
}

pub async fn get_system_health(config: &Config, api: &ApiClient) -> SystemHealthStatus {
    let backend = check_backend_reachable(api).await;
    let backend_reachable = backend.passed;
    let storage = check_storage_writability(&config.session_storage_file());

    SystemHealthStatus {
        // The site itself serves without the backend
        healthy: storage.passed,
        backend_reachable,
        checks: vec![backend, storage],
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}
