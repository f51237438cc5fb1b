// Server-rendered site: maud markup plus HTMX for in-place swaps

pub mod admin;
mod assets;
pub mod auth;
pub mod form;
pub mod layout;
pub mod leads;
mod pages;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::AppState;
use leads::{EmergencyLead, QuoteLead};

pub fn create_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        // Public pages
        .route("/", get(pages::home))
        .route("/services", get(pages::services))
        .route("/how-it-works", get(pages::how_it_works))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        // Lead capture
        .route(
            "/quote",
            get(leads::show::<QuoteLead>).post(leads::submit::<QuoteLead>),
        )
        .route(
            "/emergency",
            get(leads::show::<EmergencyLead>).post(leads::submit::<EmergencyLead>),
        )
        // Auth
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        // Back-office, guarded
        .merge(admin::router(state))
        .route("/assets/*path", get(assets::serve))
        .fallback(pages::not_found)
}
