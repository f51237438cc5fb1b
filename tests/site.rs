mod common;

use axum::http::StatusCode;
use common::*;

#[tokio::test]
async fn test_public_pages_render() {
    let site = site().await;
    let paths = [
        "/",
        "/services",
        "/how-it-works",
        "/about",
        "/contact",
        "/quote",
        "/emergency",
        "/login",
    ];
    for path in paths {
        let response = site.get(path, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let site = site().await;
    let response = site.get("/pricing", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Oops! Page not found"));
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let site = site().await;
    let response = site.get("/assets/site.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_quote_submission_creates_record() {
    let site = site().await;

    let response = site.post_form("/quote", QUOTE_FORM, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Quote Request Sent"));
    // Form is cleared after success
    assert!(!body.contains("value=\"Sam Ortiz\""));

    assert_eq!(site.backend.calls("POST quotes"), 1);
    let stored = site.backend.record("quotes", "quotes-1").unwrap();
    assert_eq!(stored["contactName"], "Sam Ortiz");
    assert_eq!(stored["staffNeeded"], 12);
    assert_eq!(
        stored["services"],
        serde_json::json!(["Event Staff", "Security Personnel"])
    );
    assert!(stored.get("specialRequirements").is_none());
}

#[tokio::test]
async fn test_emergency_submission_sends_typed_values() {
    let site = site().await;

    let response = site.post_form("/emergency", EMERGENCY_FORM, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Emergency Request Received"));

    let stored = site.backend.record("emergency", "emergency-1").unwrap();
    assert_eq!(stored["urgency"], "immediate");
    assert_eq!(stored["staffNeeded"], 5);
    assert_eq!(stored["workType"], "security");
    assert!(stored.get("duration").is_none());
}

#[tokio::test]
async fn test_invalid_emergency_form_never_reaches_backend() {
    let site = site().await;

    let fields: Vec<(&str, &str)> = EMERGENCY_FORM
        .iter()
        .copied()
        .filter(|(name, _)| *name != "phone")
        .map(|(name, value)| if name == "staffNeeded" { (name, "0") } else { (name, value) })
        .collect();

    let response = site.post_form("/emergency", &fields, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("Phone number is required"));
    assert!(body.contains("At least 1 staff member is required"));
    // Values the user typed are kept
    assert!(body.contains("value=\"Dana Reyes\""));

    assert_eq!(site.backend.calls("POST emergency"), 0);
    assert_eq!(site.backend.count("emergency"), 0);
}

#[tokio::test]
async fn test_quote_without_services_is_rejected() {
    let site = site().await;
    let fields: Vec<(&str, &str)> = QUOTE_FORM
        .iter()
        .copied()
        .filter(|(name, _)| *name != "services")
        .collect();

    let response = site.post_form("/quote", &fields, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Select at least one service"));
    assert_eq!(site.backend.calls("POST quotes"), 0);
}

#[tokio::test]
async fn test_health_reports_backend() {
    let site = site().await;
    let response = site.get("/health", None).await;
    let body = body_text(response).await;
    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["backend_reachable"], true);
}

#[tokio::test]
async fn test_startup_checks_cover_url_storage_and_backend() {
    let site = site().await;
    let report = sikati::startup::run_startup_checks(&site.state.config, &site.state.api).await;
    let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["api_url", "session_storage", "backend_reachable"]);
    assert!(report.all_passed, "{}", report.summary);
}
