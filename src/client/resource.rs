//! Backend resources addressed by the client and the query cache.

use serde::{de::DeserializeOwned, Serialize};

use crate::models::{EmergencyDraft, EmergencyRequest, Quote, QuoteDraft};
use crate::query::QueryKey;

/// A REST collection on the backend with list/get/create/update/delete.
pub trait Resource: Send + Sync + 'static {
    /// Record as returned by the backend
    type Record: DeserializeOwned + Serialize + Clone + Send + Sync + 'static;
    /// Body sent on create and update
    type Draft: Serialize + Clone + Send + Sync + 'static;

    /// Path below the API base URL, without leading or trailing slash
    const PATH: &'static str;
    /// Cache scope of the full collection
    const LIST_SCOPE: &'static str;
    /// Cache scope of single records
    const ITEM_SCOPE: &'static str;
    /// Singular display name
    const NAME: &'static str;

    fn id(record: &Self::Record) -> &str;

    fn draft(record: &Self::Record) -> &Self::Draft;

    fn list_key() -> QueryKey {
        QueryKey::new(Self::LIST_SCOPE)
    }

    fn item_key(id: &str) -> QueryKey {
        QueryKey::with_id(Self::ITEM_SCOPE, id)
    }
}

/// `contact/quotes`
pub struct Quotes;

impl Resource for Quotes {
    type Record = Quote;
    type Draft = QuoteDraft;

    const PATH: &'static str = "contact/quotes";
    const LIST_SCOPE: &'static str = "quoteRequests";
    const ITEM_SCOPE: &'static str = "quote";
    const NAME: &'static str = "Quote";

    fn id(record: &Quote) -> &str {
        &record.id
    }

    fn draft(record: &Quote) -> &QuoteDraft {
        &record.details
    }
}

/// `contact/emergency`
pub struct EmergencyRequests;

impl Resource for EmergencyRequests {
    type Record = EmergencyRequest;
    type Draft = EmergencyDraft;

    const PATH: &'static str = "contact/emergency";
    const LIST_SCOPE: &'static str = "emergencyContacts";
    const ITEM_SCOPE: &'static str = "emergency";
    const NAME: &'static str = "Emergency Request";

    fn id(record: &EmergencyRequest) -> &str {
        &record.id
    }

    fn draft(record: &EmergencyRequest) -> &EmergencyDraft {
        &record.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys() {
        assert_eq!(Quotes::list_key().to_string(), "quoteRequests");
        assert_eq!(Quotes::item_key("q123").to_string(), "quote/q123");
        assert_eq!(EmergencyRequests::list_key().to_string(), "emergencyContacts");
        assert_eq!(EmergencyRequests::item_key("e9").to_string(), "emergency/e9");
    }
}
