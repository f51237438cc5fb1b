//! Emergency staffing request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::choice::choice_enum;

choice_enum! {
    /// How soon staff must be on site
    Urgency {
        Immediate = "immediate" => "Immediate (Within 2 hours)",
        SameDay = "same-day" => "Same Day",
        NextDay = "next-day" => "Next Day",
        WithinWeek = "within-week" | "weekend" => "Within a Week",
    }
}

choice_enum! {
    /// Expected length of an emergency engagement
    EmergencyDuration {
        FewHours = "few-hours" => "Few Hours",
        HalfDay = "half-day" => "Half Day",
        FullDay = "full-day" => "Full Day",
        MultipleDays = "multiple-days" => "Multiple Days",
        Ongoing = "ongoing" => "Ongoing",
    }
}

choice_enum! {
    WorkType {
        EventSupport = "event-support" => "Event Support",
        Security = "security" => "Security",
        Labor = "labor" => "General Labor",
        Admin = "admin" => "Administrative",
        Technical = "technical" => "Technical",
        Cleaning = "cleaning" => "Cleaning",
        Other = "other" => "Other",
    }
}

choice_enum! {
    /// Channel the requester wants to be reached on
    ContactChannel {
        Call = "call" => "Call me immediately",
        Text = "text" => "Send SMS updates",
        Email = "email" => "Email updates",
    }
}

/// The requester-supplied part of an emergency request. Sent as the body of
/// create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: String,
    pub urgency: Urgency,
    pub staff_needed: u32,
    pub location: String,
    pub start_date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<EmergencyDuration>,
    pub work_type: WorkType,
    pub emergency_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    pub contact: ContactChannel,
}

/// A stored emergency request as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyRequest {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: EmergencyDraft,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
