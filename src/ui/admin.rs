//! Back-office dashboard and record detail pages.
//!
//! Every read goes through the shared [`QueryClient`](crate::query::QueryClient).
//! The dashboard renders cached lists inline and otherwise hands the table to
//! an HTMX fragment, so the shell shows a loading placeholder while the list
//! is fetched. Writes run as mutations that invalidate the dependent keys
//! before the browser is redirected.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use maud::{html, Markup};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::auth::{require_admin, AdminSession};
use super::form::{render_form, SubmitLabels};
use super::layout::{admin_page, display_date, notice, Notice};
use crate::client::{ClientError, EmergencyRequests, Quotes, Resource};
use crate::forms::{self, FieldErrors, FormSchema, RawForm};
use crate::guard::ADMIN_ROUTE;
use crate::models::{Choice, EmergencyRequest, Quote};
use crate::AppState;

const FLASH_COOKIE: &str = "sikati_flash";

const SAVE: SubmitLabels = SubmitLabels {
    idle: "Save Changes",
    busy: "Saving…",
};

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(ADMIN_ROUTE, get(dashboard))
        .route(EmergencyRequests::FRAGMENT, get(list_fragment::<EmergencyRequests>))
        .route(Quotes::FRAGMENT, get(list_fragment::<Quotes>))
        .route(
            "/admin/emergency-request/:id",
            get(detail::<EmergencyRequests>).post(update::<EmergencyRequests>),
        )
        .route(
            "/admin/emergency-request/:id/delete",
            post(delete::<EmergencyRequests>),
        )
        .route("/admin/quote/:id", get(detail::<Quotes>).post(update::<Quotes>))
        .route("/admin/quote/:id/delete", post(delete::<Quotes>))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

/// How a backend resource is presented in the back-office.
pub trait AdminView: Resource {
    /// Detail route prefix; the record id is appended
    const ROUTE: &'static str;
    /// Route of the list table fragment
    const FRAGMENT: &'static str;
    const PLURAL: &'static str;
    const EMPTY: &'static str;
    const NOT_FOUND: &'static str;
    const UPDATED: (&'static str, &'static str);
    const DELETED: (&'static str, &'static str);

    fn schema() -> &'static FormSchema;

    fn validate(raw: &RawForm) -> Result<Self::Draft, FieldErrors>;

    fn to_raw(draft: &Self::Draft) -> RawForm;

    fn title(record: &Self::Record) -> String;

    fn header_row() -> Markup;

    fn row(record: &Self::Record) -> Markup;

    fn details(record: &Self::Record) -> Markup;

    fn detail_url(id: &str) -> String {
        format!("{}/{}", Self::ROUTE, id)
    }
}

impl AdminView for Quotes {
    const ROUTE: &'static str = "/admin/quote";
    const FRAGMENT: &'static str = "/admin/fragments/quotes";
    const PLURAL: &'static str = "Quotes";
    const EMPTY: &'static str = "No quote requests yet.";
    const NOT_FOUND: &'static str = "Quote not found.";
    const UPDATED: (&'static str, &'static str) =
        ("Quote Updated", "Quote has been successfully updated.");
    const DELETED: (&'static str, &'static str) =
        ("Quote Deleted", "Quote has been successfully deleted.");

    fn schema() -> &'static FormSchema {
        &forms::quote::SCHEMA
    }

    fn validate(raw: &RawForm) -> Result<Self::Draft, FieldErrors> {
        forms::quote::validate(raw)
    }

    fn to_raw(draft: &Self::Draft) -> RawForm {
        forms::quote::to_raw(draft)
    }

    fn title(quote: &Quote) -> String {
        format!("Quote from {}", quote.details.contact_name)
    }

    fn header_row() -> Markup {
        header_cells(&[
            "Contact",
            "Company",
            "Event Type",
            "Date",
            "Duration",
            "Staff Needed",
            "Location",
            "Budget",
            "Services",
            "Created",
            "Actions",
        ])
    }

    fn row(quote: &Quote) -> Markup {
        let q = &quote.details;
        let (services, more) = quote.services_preview(2);
        html! {
            tr {
                td {
                    div class="strong" { (q.contact_name) }
                    div class="muted" { (q.email) }
                    div class="muted" { (q.phone) }
                }
                td { (q.company_name) }
                td {
                    span class={"badge event-" (q.event_type.as_str())} { (q.event_type.label()) }
                }
                td { (display_date(&q.start_date)) }
                td { (label_or_dash(q.duration)) }
                td { (q.staff_needed) }
                td { (q.location) }
                td { (label_or_dash(q.budget_range)) }
                td {
                    @for service in services {
                        span class="badge badge-outline" { (service) }
                    }
                    @if more > 0 {
                        span class="muted" { "+" (more) " more" }
                    }
                }
                td { (created(quote.created_at)) }
                td { a href=(Self::detail_url(&quote.id)) { "View" } }
            }
        }
    }

    fn details(quote: &Quote) -> Markup {
        let q = &quote.details;
        html! {
            section class="panel" {
                h2 { "Contact" }
                dl {
                    dt { "Contact Name" } dd { (q.contact_name) }
                    dt { "Company" } dd { (q.company_name) }
                    dt { "Email" } dd { a href={"mailto:" (q.email)} { (q.email) } }
                    dt { "Phone" } dd { a href={"tel:" (q.phone)} { (q.phone) } }
                }
            }
            section class="panel" {
                h2 { "Event" }
                dl {
                    dt { "Event Type" } dd { (q.event_type.label()) }
                    dt { "Start Date" } dd { (display_date(&q.start_date)) }
                    dt { "Duration" } dd { (label_or_dash(q.duration)) }
                    dt { "Staff Needed" } dd { (q.staff_needed) }
                    dt { "Location" } dd { (q.location) }
                    dt { "Budget Range" } dd { (label_or_dash(q.budget_range)) }
                    dt { "Services" }
                    dd {
                        @for service in &q.services {
                            span class="badge badge-outline" { (service) }
                        }
                    }
                    dt { "Special Requirements" }
                    dd { (q.special_requirements.as_deref().unwrap_or("None")) }
                    dt { "Submitted" } dd { (created(quote.created_at)) }
                }
            }
        }
    }
}

impl AdminView for EmergencyRequests {
    const ROUTE: &'static str = "/admin/emergency-request";
    const FRAGMENT: &'static str = "/admin/fragments/emergency-requests";
    const PLURAL: &'static str = "Emergency Requests";
    const EMPTY: &'static str = "No emergency requests yet.";
    const NOT_FOUND: &'static str = "Emergency request not found.";
    const UPDATED: (&'static str, &'static str) = (
        "Emergency Request Updated",
        "Emergency request has been successfully updated.",
    );
    const DELETED: (&'static str, &'static str) = (
        "Emergency Request Deleted",
        "Emergency request has been successfully deleted.",
    );

    fn schema() -> &'static FormSchema {
        &forms::emergency::SCHEMA
    }

    fn validate(raw: &RawForm) -> Result<Self::Draft, FieldErrors> {
        forms::emergency::validate(raw)
    }

    fn to_raw(draft: &Self::Draft) -> RawForm {
        forms::emergency::to_raw(draft)
    }

    fn title(request: &EmergencyRequest) -> String {
        format!("Emergency request from {}", request.details.name)
    }

    fn header_row() -> Markup {
        header_cells(&[
            "Requester",
            "Company",
            "Urgency",
            "Staff",
            "Location",
            "Start",
            "Work Type",
            "Contact",
            "Created",
            "Actions",
        ])
    }

    fn row(request: &EmergencyRequest) -> Markup {
        let e = &request.details;
        html! {
            tr {
                td {
                    div class="strong" { (e.name) }
                    div class="muted" { (e.email) }
                    div class="muted" { (e.phone) }
                }
                td { (e.company) }
                td { span class={"badge urgency-" (e.urgency.as_str())} { (e.urgency.label()) } }
                td { (e.staff_needed) }
                td { (e.location) }
                td { (display_datetime(&e.start_date_time)) }
                td { (e.work_type.label()) }
                td { (e.contact.label()) }
                td { (created(request.created_at)) }
                td { a href=(Self::detail_url(&request.id)) { "View" } }
            }
        }
    }

    fn details(request: &EmergencyRequest) -> Markup {
        let e = &request.details;
        html! {
            section class="panel" {
                h2 { "Requester" }
                dl {
                    dt { "Name" } dd { (e.name) }
                    dt { "Company" } dd { (e.company) }
                    dt { "Email" } dd { a href={"mailto:" (e.email)} { (e.email) } }
                    dt { "Phone" } dd { a href={"tel:" (e.phone)} { (e.phone) } }
                    dt { "Preferred Contact" } dd { (e.contact.label()) }
                }
            }
            section class="panel" {
                h2 { "Request" }
                dl {
                    dt { "Urgency" }
                    dd {
                        span class={"badge urgency-" (e.urgency.as_str())} { (e.urgency.label()) }
                    }
                    dt { "Staff Needed" } dd { (e.staff_needed) }
                    dt { "Work Type" } dd { (e.work_type.label()) }
                    dt { "Location" } dd { (e.location) }
                    dt { "Start" } dd { (display_datetime(&e.start_date_time)) }
                    dt { "Duration" } dd { (label_or_dash(e.duration)) }
                    dt { "Description" } dd { (e.emergency_description) }
                    dt { "Special Requirements" }
                    dd { (e.special_requirements.as_deref().unwrap_or("None")) }
                    dt { "Submitted" } dd { (created(request.created_at)) }
                }
            }
        }
    }
}

fn header_cells(labels: &[&str]) -> Markup {
    html! {
        tr {
            @for label in labels {
                th { (label) }
            }
        }
    }
}

fn label_or_dash<C: Choice>(choice: Option<C>) -> &'static str {
    choice.map(|c| c.label()).unwrap_or("—")
}

fn created(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn display_datetime(value: &str) -> String {
    forms::parse_datetime(value)
        .map(|t| t.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| value.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlashAction {
    Updated,
    Deleted,
}

impl FlashAction {
    fn as_str(self) -> &'static str {
        match self {
            FlashAction::Updated => "updated",
            FlashAction::Deleted => "deleted",
        }
    }
}

/// Queue a confirmation notice for the page the browser is redirected to.
fn set_flash<R: AdminView>(jar: CookieJar, action: FlashAction) -> CookieJar {
    let value = format!("{}.{}", R::ITEM_SCOPE, action.as_str());
    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path(ADMIN_ROUTE)
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

fn flash_notice<R: AdminView>(value: &str) -> Option<Notice> {
    let (scope, action) = value.split_once('.')?;
    if scope != R::ITEM_SCOPE {
        return None;
    }
    let (title, message) = match action {
        "updated" => R::UPDATED,
        "deleted" => R::DELETED,
        _ => return None,
    };
    Some(Notice::success(title, message))
}

/// Read and clear the pending notice.
fn take_flash(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let notice =
        flash_notice::<Quotes>(&value).or_else(|| flash_notice::<EmergencyRequests>(&value));
    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path(ADMIN_ROUTE));
    (jar, notice)
}

fn table<R: AdminView>(records: &[R::Record]) -> Markup {
    html! {
        section class="panel" id=(R::LIST_SCOPE) {
            h2 { (R::PLURAL) " (" (records.len()) ")" }
            @if records.is_empty() {
                p class="empty" { (R::EMPTY) }
            } @else {
                div class="table-wrap" {
                    table {
                        thead { (R::header_row()) }
                        tbody {
                            @for record in records {
                                (R::row(record))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn loading_panel<R: AdminView>() -> Markup {
    html! {
        section class="panel" id=(R::LIST_SCOPE)
            hx-get=(R::FRAGMENT) hx-trigger="load" hx-swap="outerHTML" {
            h2 { (R::PLURAL) }
            div class="loading" aria-busy="true" {
                span class="spinner" {}
                "Loading…"
            }
        }
    }
}

fn list_error<R: AdminView>(error: &ClientError) -> Markup {
    html! {
        section class="panel" id=(R::LIST_SCOPE) {
            h2 { (R::PLURAL) }
            (notice(&Notice::error(
                format!("Could not load {}.", R::PLURAL.to_lowercase()),
                error.user_message(),
            )))
        }
    }
}

/// Cached list inline when fresh, otherwise a placeholder that loads it.
fn list_panel<R: AdminView>(state: &AppState) -> Markup {
    let cached = state.queries.peek::<Vec<R::Record>>(&R::list_key());
    match cached.fresh_data() {
        Some(records) => table::<R>(records.as_slice()),
        None => loading_panel::<R>(),
    }
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    jar: CookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);
    let content = html! {
        h1 { "Dashboard" }
        p class="muted" { "Welcome back, " (admin.user.display_name()) "." }
        (list_panel::<EmergencyRequests>(&state))
        (list_panel::<Quotes>(&state))
    };
    (jar, admin_page("Dashboard", &admin.user, flash.as_ref(), content)).into_response()
}

async fn list_fragment<R: AdminView>(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
) -> Response {
    let api = state.api.with_token(Some(admin.token));
    let result = state
        .queries
        .query(R::list_key(), move || async move { api.list::<R>().await })
        .await;

    match result {
        Ok(records) => table::<R>(records.as_slice()).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, list_error::<R>(&e)).into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct DetailParams {
    edit: Option<String>,
    delete: Option<String>,
}

enum Panel<'a> {
    None,
    Edit(&'a RawForm, &'a FieldErrors),
    ConfirmDelete,
}

fn edit_panel<R: AdminView>(id: &str, values: &RawForm, errors: &FieldErrors) -> Markup {
    let url = R::detail_url(id);
    html! {
        section class="panel edit-panel" {
            h2 { "Edit " (R::NAME) }
            (render_form(R::schema(), &url, values, errors, &SAVE))
            a class="button button-link" href=(url) { "Cancel" }
        }
    }
}

fn confirm_panel<R: AdminView>(id: &str) -> Markup {
    let url = R::detail_url(id);
    html! {
        section class="panel confirm-panel" role="alertdialog" {
            h2 { "Delete this " (R::NAME.to_lowercase()) "?" }
            p { "This action cannot be undone." }
            form method="post" action={(url) "/delete"} hx-disabled-elt="find button" {
                button class="button button-danger" type="submit" {
                    span class="when-idle" { "Delete" }
                    span class="when-busy" { "Deleting…" }
                }
            }
            a class="button button-link" href=(url) { "Cancel" }
        }
    }
}

fn record_view<R: AdminView>(record: &R::Record, panel: Panel<'_>) -> Markup {
    let id = R::id(record);
    let url = R::detail_url(id);
    html! {
        div class="detail-header" {
            a href=(ADMIN_ROUTE) { "← Back to Dashboard" }
            h1 { (R::title(record)) }
            div class="actions" {
                a class="button button-outline" href={(url) "?edit=1"} { "Edit" }
                a class="button button-danger" href={(url) "?delete=confirm"} { "Delete" }
            }
        }
        @match panel {
            Panel::None => {}
            Panel::Edit(values, errors) => {
                (edit_panel::<R>(id, values, errors))
            }
            Panel::ConfirmDelete => {
                (confirm_panel::<R>(id))
            }
        }
        (R::details(record))
    }
}

/// A failed read shows an explicit not-found or error page, never stale data.
fn read_failure<R: AdminView>(admin: &AdminSession, error: &ClientError) -> (StatusCode, Markup) {
    let (status, message) = if error.is_not_found() {
        (StatusCode::NOT_FOUND, R::NOT_FOUND.to_string())
    } else {
        (StatusCode::BAD_GATEWAY, error.user_message())
    };
    let content = html! {
        section class="panel not-found" {
            p { (message) }
            a class="button button-outline" href=(ADMIN_ROUTE) { "Back to Dashboard" }
        }
    };
    (status, admin_page(R::NAME, &admin.user, None, content))
}

async fn detail<R: AdminView>(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
    jar: CookieJar,
) -> Response {
    let (jar, flash) = take_flash(jar);

    let api = state.api.with_token(Some(admin.token.clone()));
    let fetch_id = id.clone();
    let result = state
        .queries
        .query(R::item_key(&id), move || async move { api.get::<R>(&fetch_id).await })
        .await;

    let record = match result {
        Ok(record) => record,
        Err(e) => return (jar, read_failure::<R>(&admin, &e)).into_response(),
    };

    let values;
    let no_errors = FieldErrors::default();
    let panel = if params.delete.as_deref() == Some("confirm") {
        Panel::ConfirmDelete
    } else if params.edit.is_some() {
        values = R::to_raw(R::draft(&record));
        Panel::Edit(&values, &no_errors)
    } else {
        Panel::None
    };

    let content = record_view::<R>(&record, panel);
    (jar, admin_page(&R::title(&record), &admin.user, flash.as_ref(), content)).into_response()
}

/// Re-render the edit surface with the submitted values kept.
fn edit_page<R: AdminView>(
    state: &AppState,
    admin: &AdminSession,
    id: &str,
    values: &RawForm,
    errors: &FieldErrors,
    failure: Option<&Notice>,
) -> Markup {
    let cached = state.queries.peek::<R::Record>(&R::item_key(id));
    let content = match cached.data.as_deref() {
        Some(record) => record_view::<R>(record, Panel::Edit(values, errors)),
        None => edit_panel::<R>(id, values, errors),
    };
    admin_page(&format!("Edit {}", R::NAME), &admin.user, failure, content)
}

async fn update<R: AdminView>(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(id): Path<String>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let raw = RawForm::from_pairs(pairs);
    let draft = match R::validate(&raw) {
        Ok(draft) => draft,
        Err(errors) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_page::<R>(&state, &admin, &id, &raw, &errors, None),
            )
                .into_response();
        }
    };

    let api = state.api.with_token(Some(admin.token.clone()));
    let result = state
        .queries
        .mutate(api.update::<R>(&id, &draft), |queries, _| {
            queries.invalidate(&R::item_key(&id));
            queries.invalidate(&R::list_key());
        })
        .await;

    match result {
        Ok(_) => {
            info!(resource = R::NAME, id = %id, user = %admin.user.email, "Record updated");
            let jar = set_flash::<R>(jar, FlashAction::Updated);
            (jar, Redirect::to(&R::detail_url(&id))).into_response()
        }
        Err(e) => {
            let failure = Notice::error("Update Failed", e.user_message());
            (
                StatusCode::BAD_GATEWAY,
                edit_page::<R>(&state, &admin, &id, &raw, &FieldErrors::default(), Some(&failure)),
            )
                .into_response()
        }
    }
}

async fn delete<R: AdminView>(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminSession>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Response {
    let api = state.api.with_token(Some(admin.token.clone()));
    let result = state
        .queries
        .mutate(api.delete::<R>(&id), |queries, _| {
            queries.invalidate(&R::list_key());
            queries.remove(&R::item_key(&id));
        })
        .await;

    match result {
        Ok(()) => {
            info!(resource = R::NAME, id = %id, user = %admin.user.email, "Record deleted");
            let jar = set_flash::<R>(jar, FlashAction::Deleted);
            (jar, Redirect::to(ADMIN_ROUTE)).into_response()
        }
        Err(e) => {
            let failure = Notice::error("Delete Failed", e.user_message());
            let cached = state.queries.peek::<R::Record>(&R::item_key(&id));
            let content = match cached.data.as_deref() {
                Some(record) => record_view::<R>(record, Panel::ConfirmDelete),
                None => confirm_panel::<R>(&id),
            };
            (
                StatusCode::BAD_GATEWAY,
                admin_page(R::NAME, &admin.user, Some(&failure), content),
            )
                .into_response()
        }
    }
}
