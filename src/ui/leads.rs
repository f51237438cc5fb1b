//! Quote and emergency lead-capture pages.
//!
//! Input is validated against the form schema before anything reaches the
//! backend; a rejected submission re-renders with its values and field
//! errors and issues no API call.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use maud::{html, Markup};
use std::sync::Arc;
use tracing::{debug, info};

use super::form::{render_form, SubmitLabels};
use super::layout::{public_page, Notice};
use crate::api::metrics::record_lead_submission;
use crate::client::{EmergencyRequests, Quotes, Resource};
use crate::forms::{self, FieldErrors, FormSchema, RawForm};
use crate::AppState;

pub trait LeadForm: Send + Sync + 'static {
    type Resource: Resource;

    /// Label used in logs and metrics
    const FORM: &'static str;
    const ACTION: &'static str;
    const TITLE: &'static str;
    const INTRO: &'static str;
    const SUBMIT: SubmitLabels;
    const SUCCESS: (&'static str, &'static str);

    fn schema() -> &'static FormSchema;

    fn validate(raw: &RawForm) -> Result<<Self::Resource as Resource>::Draft, FieldErrors>;
}

pub struct QuoteLead;

impl LeadForm for QuoteLead {
    type Resource = Quotes;

    const FORM: &'static str = "quote";
    const ACTION: &'static str = "/quote";
    const TITLE: &'static str = "Request a Quote";
    const INTRO: &'static str =
        "Tell us about your staffing needs and we'll provide a customized solution.";
    const SUBMIT: SubmitLabels = SubmitLabels {
        idle: "Submit Quote Request",
        busy: "Submitting…",
    };
    const SUCCESS: (&'static str, &'static str) = (
        "Quote Request Sent",
        "Thank you! We'll get back to you within 1 hour.",
    );

    fn schema() -> &'static FormSchema {
        &forms::quote::SCHEMA
    }

    fn validate(raw: &RawForm) -> Result<crate::models::QuoteDraft, FieldErrors> {
        forms::quote::validate(raw)
    }
}

pub struct EmergencyLead;

impl LeadForm for EmergencyLead {
    type Resource = EmergencyRequests;

    const FORM: &'static str = "emergency";
    const ACTION: &'static str = "/emergency";
    const TITLE: &'static str = "Emergency Staffing";
    const INTRO: &'static str =
        "Need staff urgently? Submit your request and our team responds immediately.";
    const SUBMIT: SubmitLabels = SubmitLabels {
        idle: "Submit Emergency Request",
        busy: "Sending request…",
    };
    const SUCCESS: (&'static str, &'static str) = (
        "Emergency Request Received",
        "Our team has been alerted and will contact you shortly.",
    );

    fn schema() -> &'static FormSchema {
        &forms::emergency::SCHEMA
    }

    fn validate(raw: &RawForm) -> Result<crate::models::EmergencyDraft, FieldErrors> {
        forms::emergency::validate(raw)
    }
}

fn render<L: LeadForm>(values: &RawForm, errors: &FieldErrors, notice: Option<&Notice>) -> Markup {
    public_page(
        L::TITLE,
        notice,
        html! {
            section class="hero" {
                div class="container" {
                    h1 { (L::TITLE) }
                    p class="lead" { (L::INTRO) }
                }
            }
            section class="container narrow" {
                div class="card" {
                    (render_form(L::schema(), L::ACTION, values, errors, &L::SUBMIT))
                }
            }
        },
    )
}

/// GET handler: an empty form.
pub async fn show<L: LeadForm>() -> Markup {
    render::<L>(&RawForm::new(), &FieldErrors::default(), None)
}

/// POST handler: validate, then create through the backend.
pub async fn submit<L: LeadForm>(
    State(state): State<Arc<AppState>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let raw = RawForm::from_pairs(pairs);

    let draft = match L::validate(&raw) {
        Ok(draft) => draft,
        Err(errors) => {
            debug!(
                form = L::FORM,
                fields = ?errors.fields().collect::<Vec<_>>(),
                "Lead form rejected"
            );
            record_lead_submission(L::FORM, "invalid");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                render::<L>(&raw, &errors, None),
            )
                .into_response();
        }
    };

    match state.api.create::<L::Resource>(&draft).await {
        Ok(record) => {
            let id = <L::Resource as Resource>::id(&record);
            info!(form = L::FORM, id = %id, "Lead submitted");
            record_lead_submission(L::FORM, "created");
            state.queries.invalidate(&<L::Resource as Resource>::list_key());

            let (title, message) = L::SUCCESS;
            render::<L>(
                &RawForm::new(),
                &FieldErrors::default(),
                Some(&Notice::success(title, message)),
            )
            .into_response()
        }
        Err(e) => {
            record_lead_submission(L::FORM, "failed");
            let notice = Notice::error("Submission Failed", e.user_message());
            (
                StatusCode::BAD_GATEWAY,
                render::<L>(&raw, &FieldErrors::default(), Some(&notice)),
            )
                .into_response()
        }
    }
}
