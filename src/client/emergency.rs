use super::{ApiClient, ClientError, EmergencyRequests};
use crate::models::{EmergencyDraft, EmergencyRequest};

impl ApiClient {
    pub async fn create_emergency(
        &self,
        draft: &EmergencyDraft,
    ) -> Result<EmergencyRequest, ClientError> {
        self.create::<EmergencyRequests>(draft).await
    }

    pub async fn list_emergency_requests(&self) -> Result<Vec<EmergencyRequest>, ClientError> {
        self.list::<EmergencyRequests>().await
    }

    pub async fn get_emergency_request(&self, id: &str) -> Result<EmergencyRequest, ClientError> {
        self.get::<EmergencyRequests>(id).await
    }

    pub async fn update_emergency_request(
        &self,
        id: &str,
        draft: &EmergencyDraft,
    ) -> Result<EmergencyRequest, ClientError> {
        self.update::<EmergencyRequests>(id, draft).await
    }

    pub async fn delete_emergency_request(&self, id: &str) -> Result<(), ClientError> {
        self.delete::<EmergencyRequests>(id).await
    }
}
