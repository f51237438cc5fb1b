use super::{ApiClient, ClientError, Quotes};
use crate::models::{Quote, QuoteDraft};

impl ApiClient {
    pub async fn create_quote(&self, draft: &QuoteDraft) -> Result<Quote, ClientError> {
        self.create::<Quotes>(draft).await
    }

    pub async fn list_quotes(&self) -> Result<Vec<Quote>, ClientError> {
        self.list::<Quotes>().await
    }

    pub async fn get_quote(&self, id: &str) -> Result<Quote, ClientError> {
        self.get::<Quotes>(id).await
    }

    pub async fn update_quote(&self, id: &str, draft: &QuoteDraft) -> Result<Quote, ClientError> {
        self.update::<Quotes>(id, draft).await
    }

    pub async fn delete_quote(&self, id: &str) -> Result<(), ClientError> {
        self.delete::<Quotes>(id).await
    }
}
