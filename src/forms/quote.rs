use super::{
    date_input_value, FieldErrors, FieldKind, FieldReader, FieldSpec, FormSchema, RawForm,
};
use crate::models::{BudgetRange, Choice, EventType, QuoteDraft, QuoteDuration, SERVICE_LABELS};

pub static SCHEMA: FormSchema = FormSchema {
    name: "quote",
    fields: &[
        FieldSpec::required(
            "contactName",
            "Contact Name",
            FieldKind::Text { min_len: 2 },
            "Contact name must be at least 2 characters",
        ),
        FieldSpec::required(
            "companyName",
            "Company Name",
            FieldKind::Text { min_len: 1 },
            "Company name is required",
        ),
        FieldSpec::required("email", "Email Address", FieldKind::Email, "Invalid email address"),
        FieldSpec::required("phone", "Phone Number", FieldKind::Phone, "Phone number is required"),
        FieldSpec::required(
            "eventType",
            "Event Type",
            FieldKind::Select(EventType::OPTIONS),
            "Please select an event type",
        ),
        FieldSpec::required("startDate", "Start Date", FieldKind::Date, "Start date is required"),
        FieldSpec::optional(
            "duration",
            "Duration",
            FieldKind::Select(QuoteDuration::OPTIONS),
            "Please select a valid duration",
        ),
        FieldSpec::required(
            "staffNeeded",
            "Number of Staff Needed",
            FieldKind::Count,
            "At least 1 staff member is required",
        ),
        FieldSpec::required(
            "location",
            "Event Location",
            FieldKind::Text { min_len: 1 },
            "Location is required",
        ),
        FieldSpec::required(
            "services",
            "Services Required",
            FieldKind::Checkboxes {
                options: SERVICE_LABELS,
                min: 1,
            },
            "Select at least one service",
        ),
        FieldSpec::optional(
            "specialRequirements",
            "Special Requirements",
            FieldKind::LongText,
            "",
        ),
        FieldSpec::optional(
            "budgetRange",
            "Budget Range",
            FieldKind::Select(BudgetRange::OPTIONS),
            "Please select a valid budget range",
        ),
    ],
};

pub fn validate(raw: &RawForm) -> Result<QuoteDraft, FieldErrors> {
    let read = FieldReader::check(&SCHEMA, raw);
    let draft = (|| {
        Some(QuoteDraft {
            contact_name: read.text("contactName"),
            company_name: read.text("companyName"),
            email: read.text("email"),
            phone: read.text("phone"),
            event_type: read.choice("eventType")?,
            start_date: read.text("startDate"),
            duration: read.choice("duration"),
            staff_needed: read.count("staffNeeded")?,
            location: read.text("location"),
            services: read.values("services"),
            special_requirements: read.optional_text("specialRequirements"),
            budget_range: read.choice("budgetRange"),
        })
    })();
    read.finish(draft)
}

pub fn to_raw(draft: &QuoteDraft) -> RawForm {
    let mut raw = RawForm::new();
    raw.set("contactName", &draft.contact_name);
    raw.set("companyName", &draft.company_name);
    raw.set("email", &draft.email);
    raw.set("phone", &draft.phone);
    raw.set("eventType", draft.event_type.as_str());
    raw.set("startDate", date_input_value(&draft.start_date));
    if let Some(duration) = draft.duration {
        raw.set("duration", duration.as_str());
    }
    raw.set("staffNeeded", draft.staff_needed.to_string());
    raw.set("location", &draft.location);
    for service in &draft.services {
        raw.push("services", service);
    }
    if let Some(requirements) = &draft.special_requirements {
        raw.set("specialRequirements", requirements);
    }
    if let Some(budget) = draft.budget_range {
        raw.set("budgetRange", budget.as_str());
    }
    raw
}
