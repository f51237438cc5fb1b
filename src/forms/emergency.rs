use super::{
    datetime_input_value, FieldErrors, FieldKind, FieldReader, FieldSpec, FormSchema, RawForm,
};
use crate::models::{Choice, ContactChannel, EmergencyDraft, EmergencyDuration, Urgency, WorkType};

pub static SCHEMA: FormSchema = FormSchema {
    name: "emergency",
    fields: &[
        FieldSpec::required(
            "name",
            "Full Name",
            FieldKind::Text { min_len: 2 },
            "Name must be at least 2 characters",
        ),
        FieldSpec::required("phone", "Phone Number", FieldKind::Phone, "Phone number is required"),
        FieldSpec::required("email", "Email Address", FieldKind::Email, "Invalid email address"),
        FieldSpec::required(
            "company",
            "Company/Organization",
            FieldKind::Text { min_len: 1 },
            "Company is required",
        ),
        FieldSpec::required(
            "urgency",
            "Urgency Level",
            FieldKind::Radio(Urgency::OPTIONS),
            "Please select urgency level",
        ),
        FieldSpec::required(
            "staffNeeded",
            "Number of Staff Needed",
            FieldKind::Count,
            "At least 1 staff member is required",
        ),
        FieldSpec::required(
            "location",
            "Location",
            FieldKind::Text { min_len: 1 },
            "Location is required",
        ),
        FieldSpec::required(
            "startDateTime",
            "Start Date/Time",
            FieldKind::DateTime,
            "Start date/time is required",
        ),
        FieldSpec::optional(
            "duration",
            "Expected Duration",
            FieldKind::Select(EmergencyDuration::OPTIONS),
            "Please select duration",
        ),
        FieldSpec::required(
            "workType",
            "Type of Work",
            FieldKind::Select(WorkType::OPTIONS),
            "Please select work type",
        ),
        FieldSpec::required(
            "emergencyDescription",
            "Describe the Emergency",
            FieldKind::LongText,
            "Description is required",
        ),
        FieldSpec::optional(
            "specialRequirements",
            "Special Requirements",
            FieldKind::LongText,
            "",
        ),
        FieldSpec::required(
            "contact",
            "Preferred Contact Method",
            FieldKind::Radio(ContactChannel::OPTIONS),
            "Please select contact preference",
        ),
    ],
};

pub fn validate(raw: &RawForm) -> Result<EmergencyDraft, FieldErrors> {
    let read = FieldReader::check(&SCHEMA, raw);
    let draft = (|| {
        Some(EmergencyDraft {
            name: read.text("name"),
            phone: read.text("phone"),
            email: read.text("email"),
            company: read.text("company"),
            urgency: read.choice("urgency")?,
            staff_needed: read.count("staffNeeded")?,
            location: read.text("location"),
            start_date_time: read.text("startDateTime"),
            duration: read.choice("duration"),
            work_type: read.choice("workType")?,
            emergency_description: read.text("emergencyDescription"),
            special_requirements: read.optional_text("specialRequirements"),
            contact: read.choice("contact")?,
        })
    })();
    read.finish(draft)
}

/// Prefill values for editing an existing request.
pub fn to_raw(draft: &EmergencyDraft) -> RawForm {
    let mut raw = RawForm::new();
    raw.set("name", &draft.name);
    raw.set("phone", &draft.phone);
    raw.set("email", &draft.email);
    raw.set("company", &draft.company);
    raw.set("urgency", draft.urgency.as_str());
    raw.set("staffNeeded", draft.staff_needed.to_string());
    raw.set("location", &draft.location);
    raw.set("startDateTime", datetime_input_value(&draft.start_date_time));
    if let Some(duration) = draft.duration {
        raw.set("duration", duration.as_str());
    }
    raw.set("workType", draft.work_type.as_str());
    raw.set("emergencyDescription", &draft.emergency_description);
    if let Some(requirements) = &draft.special_requirements {
        raw.set("specialRequirements", requirements);
    }
    raw.set("contact", draft.contact.as_str());
    raw
}
