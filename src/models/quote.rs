//! Quote request models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::choice::choice_enum;

choice_enum! {
    EventType {
        Government = "government" => "Government Event",
        Corporate = "corporate" => "Corporate Event",
        Private = "private" => "Private Event",
        Construction = "construction" => "Construction Project",
        Security = "security" => "Security Services",
        Hospitality = "hospitality" => "Hospitality Services",
        Other = "other" => "Other",
    }
}

choice_enum! {
    QuoteDuration {
        OneDay = "1day" => "1 Day",
        TwoToThreeDays = "2-3days" => "2-3 Days",
        OneWeek = "1week" => "1 Week",
        TwoWeeks = "2weeks" => "2 Weeks",
        OneMonth = "1month" => "1 Month",
        Ongoing = "ongoing" => "Ongoing",
    }
}

choice_enum! {
    BudgetRange {
        Under5k = "under5k" => "Under $5,000",
        From5kTo10k = "5k-10k" => "$5,000 - $10,000",
        From10kTo25k = "10k-25k" => "$10,000 - $25,000",
        From25kTo50k = "25k-50k" => "$25,000 - $50,000",
        Over50k = "over50k" => "Over $50,000",
        Discuss = "discuss" => "Prefer to discuss",
    }
}

/// Service labels offered on the quote form. Stored verbatim.
pub const SERVICE_LABELS: &[(&str, &str)] = &[
    ("General Labor", "General Labor"),
    ("Event Staff", "Event Staff"),
    ("Security Personnel", "Security Personnel"),
    ("Technical Support", "Technical Support"),
    ("Administrative Staff", "Administrative Staff"),
    ("Hospitality Services", "Hospitality Services"),
    ("Specialized Skills", "Specialized Skills"),
    ("Emergency Coverage", "Emergency Coverage"),
];

/// The requester-supplied part of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDraft {
    pub contact_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub event_type: EventType,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<QuoteDuration>,
    pub staff_needed: u32,
    pub location: String,
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<BudgetRange>,
}

/// A stored quote as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub details: QuoteDraft,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quote {
    /// First `n` services plus how many were left out.
    pub fn services_preview(&self, n: usize) -> (&[String], usize) {
        let services = &self.details.services;
        let shown = services.len().min(n);
        (&services[..shown], services.len() - shown)
    }
}
