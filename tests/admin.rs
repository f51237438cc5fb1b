mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use std::time::Duration;

use sikati::client::{EmergencyRequests, Quotes, Resource};
use sikati::models::{Quote, Role};

#[tokio::test]
async fn test_admin_without_session_redirects_to_login() {
    let site = site().await;
    let response = site.get("/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_admin_with_non_admin_role_redirects_home() {
    let site = site().await;
    let cookie = site.session_cookie(Role::from("staff".to_string()));
    let response = site.get("/admin/quote/q123", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
    assert_eq!(site.backend.calls("GET quotes/q123"), 0);
}

#[tokio::test]
async fn test_guard_uses_hx_redirect_for_fragments() {
    let site = site().await;
    let request = Request::builder()
        .uri("/admin/fragments/quotes")
        .header("hx-request", "true")
        .body(Body::empty())
        .unwrap();
    let response = site.send(request).await;
    assert_eq!(response.headers().get("hx-redirect").unwrap(), "/login");
}

#[tokio::test]
async fn test_dashboard_shows_loading_until_fetched() {
    let site = site().await;
    let cookie = site.admin_cookie();

    let response = site.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Dashboard"));
    assert!(body.contains("hx-get=\"/admin/fragments/quotes\""));
    assert!(body.contains("hx-get=\"/admin/fragments/emergency-requests\""));
    // The shell itself issues no backend reads
    assert_eq!(site.backend.calls("GET quotes"), 0);

    site.backend.seed("quotes", "q123", quote_json());
    let fragment = body_text(site.get("/admin/fragments/quotes", Some(&cookie)).await).await;
    assert!(fragment.contains("Quotes (1)"));
    assert!(fragment.contains("Sam Ortiz"));
    assert!(fragment.contains("+1 more"));

    // Now cached, so the dashboard renders the table inline
    let body = body_text(site.get("/admin", Some(&cookie)).await).await;
    assert!(body.contains("Quotes (1)"));
    assert!(!body.contains("hx-get=\"/admin/fragments/quotes\""));
    assert_eq!(site.backend.calls("GET quotes"), 1);
}

#[tokio::test]
async fn test_empty_list_is_explicit() {
    let site = site().await;
    let cookie = site.admin_cookie();
    let body = body_text(
        site.get("/admin/fragments/emergency-requests", Some(&cookie))
            .await,
    )
    .await;
    assert!(body.contains("Emergency Requests (0)"));
    assert!(body.contains("No emergency requests yet."));
}

#[tokio::test]
async fn test_concurrent_list_reads_share_one_request() {
    let site = site().await;
    site.backend.seed("emergency", "e1", emergency_json());
    site.backend.set_delay(Duration::from_millis(150));
    let cookie = site.admin_cookie();

    let (a, b) = tokio::join!(
        site.get("/admin/fragments/emergency-requests", Some(&cookie)),
        site.get("/admin/fragments/emergency-requests", Some(&cookie)),
    );
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);
    assert_eq!(site.backend.calls("GET emergency"), 1);

    let peek = site
        .state
        .queries
        .peek::<Vec<sikati::models::EmergencyRequest>>(&EmergencyRequests::list_key());
    assert_eq!(peek.fresh_data().map(|d| d.len()), Some(1));
}

#[tokio::test]
async fn test_detail_not_found() {
    let site = site().await;
    let cookie = site.admin_cookie();
    let response = site.get("/admin/quote/missing", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Quote not found."));
}

#[tokio::test]
async fn test_detail_modes() {
    let site = site().await;
    site.backend.seed("emergency", "e1", emergency_json());
    let cookie = site.admin_cookie();

    let view = body_text(site.get("/admin/emergency-request/e1", Some(&cookie)).await).await;
    assert!(view.contains("Emergency request from Dana Reyes"));
    assert!(view.contains("Immediate (Within 2 hours)"));
    assert!(!view.contains("Save Changes"));

    let edit = body_text(
        site.get("/admin/emergency-request/e1?edit=1", Some(&cookie))
            .await,
    )
    .await;
    assert!(edit.contains("Save Changes"));
    assert!(edit.contains("value=\"Dana Reyes\""));

    let confirm = body_text(
        site.get("/admin/emergency-request/e1?delete=confirm", Some(&cookie))
            .await,
    )
    .await;
    assert!(confirm.contains("This action cannot be undone."));
    assert!(confirm.contains("action=\"/admin/emergency-request/e1/delete\""));

    // All three views were served from one fetch
    assert_eq!(site.backend.calls("GET emergency/e1"), 1);
}

#[tokio::test]
async fn test_update_then_read_returns_fresh_record() {
    let site = site().await;
    site.backend.seed("quotes", "q123", quote_json());
    let cookie = site.admin_cookie();

    let before = body_text(site.get("/admin/quote/q123", Some(&cookie)).await).await;
    assert!(before.contains("Quote from Sam Ortiz"));

    let fields: Vec<(&str, &str)> = QUOTE_FORM
        .iter()
        .copied()
        .map(|(name, value)| if name == "contactName" { (name, "Alex Kim") } else { (name, value) })
        .collect();
    let response = site.post_form("/admin/quote/q123", &fields, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/quote/q123"));
    assert_eq!(site.backend.calls("PUT quotes/q123"), 1);

    let flash = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("sikati_flash="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .unwrap();
    let cookies = format!("{}; {}", cookie, flash);

    let after = body_text(site.get("/admin/quote/q123", Some(&cookies)).await).await;
    assert!(after.contains("Quote from Alex Kim"));
    assert!(after.contains("Quote has been successfully updated."));
    assert_eq!(site.backend.calls("GET quotes/q123"), 2);
}

#[tokio::test]
async fn test_edit_record_stored_with_utc_timestamp() {
    let site = site().await;
    let mut record = emergency_json();
    record["startDateTime"] = serde_json::json!("2025-03-01T08:00:00.000Z");
    site.backend.seed("emergency", "e1", record);
    let cookie = site.admin_cookie();

    let edit = body_text(
        site.get("/admin/emergency-request/e1?edit=1", Some(&cookie))
            .await,
    )
    .await;
    assert!(edit.contains("value=\"2025-03-01T08:00\""));
    assert!(!edit.contains("value=\"2025-03-01T08:00:00.000Z\""));

    // Submit the prefilled form back with one change
    let fields: Vec<(&str, &str)> = EMERGENCY_FORM
        .iter()
        .copied()
        .map(|(name, value)| if name == "staffNeeded" { (name, "8") } else { (name, value) })
        .collect();
    let response = site
        .post_form("/admin/emergency-request/e1", &fields, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(site.backend.calls("PUT emergency/e1"), 1);

    let stored = site.backend.record("emergency", "e1").unwrap();
    assert_eq!(stored["staffNeeded"], 8);
    assert_eq!(stored["startDateTime"], "2025-03-01T08:00");
}

#[tokio::test]
async fn test_invalid_update_is_not_sent() {
    let site = site().await;
    site.backend.seed("quotes", "q123", quote_json());
    let cookie = site.admin_cookie();

    let fields: Vec<(&str, &str)> = QUOTE_FORM
        .iter()
        .copied()
        .map(|(name, value)| if name == "email" { (name, "not-an-email") } else { (name, value) })
        .collect();
    let response = site.post_form("/admin/quote/q123", &fields, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Invalid email address"));
    assert_eq!(site.backend.calls("PUT quotes/q123"), 0);
}

#[tokio::test]
async fn test_delete_invalidates_list_and_returns_to_dashboard() {
    let site = site().await;
    site.backend.seed("quotes", "q123", quote_json());
    let cookie = site.admin_cookie();

    // Prime both caches
    site.get("/admin/fragments/quotes", Some(&cookie)).await;
    site.get("/admin/quote/q123", Some(&cookie)).await;
    assert!(site
        .state
        .queries
        .peek::<Vec<Quote>>(&Quotes::list_key())
        .fresh_data()
        .is_some());

    let response = site
        .post_form("/admin/quote/q123/delete", &[], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    assert_eq!(site.backend.calls("DELETE quotes/q123"), 1);
    assert!(site.backend.record("quotes", "q123").is_none());

    let list = site.state.queries.peek::<Vec<Quote>>(&Quotes::list_key());
    assert!(list.fresh_data().is_none());
    let item = site.state.queries.peek::<Quote>(&Quotes::item_key("q123"));
    assert!(item.data.is_none());

    // Next list read goes back to the backend and no longer has the record
    let fragment = body_text(site.get("/admin/fragments/quotes", Some(&cookie)).await).await;
    assert!(fragment.contains("Quotes (0)"));
    assert_eq!(site.backend.calls("GET quotes"), 2);
}

#[tokio::test]
async fn test_failed_delete_stays_on_confirm() {
    let site = site().await;
    let cookie = site.admin_cookie();
    let response = site
        .post_form("/admin/quote/gone/delete", &[], Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_text(response).await;
    assert!(body.contains("Delete Failed"));
    assert!(body.contains("This action cannot be undone."));
}

#[tokio::test]
async fn test_lead_submission_invalidates_admin_list() {
    let site = site().await;
    let cookie = site.admin_cookie();

    let first = body_text(site.get("/admin/fragments/quotes", Some(&cookie)).await).await;
    assert!(first.contains("Quotes (0)"));

    site.post_form("/quote", QUOTE_FORM, None).await;

    let second = body_text(site.get("/admin/fragments/quotes", Some(&cookie)).await).await;
    assert!(second.contains("Quotes (1)"));
    assert_eq!(site.backend.calls("GET quotes"), 2);
}

#[tokio::test]
async fn test_login_flow() {
    let site = site().await;

    let response = site
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", PASSWORD)], None)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin"));
    let session = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .unwrap();
    assert!(session.starts_with("sikati_session="));

    let dashboard = site.get("/admin", Some(&session)).await;
    assert_eq!(dashboard.status(), StatusCode::OK);

    // Logged-in visitors skip the login page
    let login = site.get("/login", Some(&session)).await;
    assert_eq!(location(&login), Some("/admin"));

    let logout = site.post_form("/logout", &[], Some(&session)).await;
    assert_eq!(location(&logout), Some("/login"));
    let after = site.get("/admin", Some(&session)).await;
    assert_eq!(location(&after), Some("/login"));
}

#[tokio::test]
async fn test_login_rejected() {
    let site = site().await;

    let response = site
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "wrong-pass")], None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_text(response).await;
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains("value=\"admin@sikati.test\""));
    assert!(!body.contains("wrong-pass"));

    let short = site
        .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "123")], None)
        .await;
    assert_eq!(short.status(), StatusCode::UNPROCESSABLE_ENTITY);
    // Only the well-formed attempt reached the backend
    assert_eq!(site.backend.calls("POST login"), 1);
}
