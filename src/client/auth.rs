use reqwest::Method;

use super::{ApiClient, ClientError};
use crate::models::{LoginRequest, LoginResponse};

const LOGIN_PATH: &str = "auth/login";

impl ApiClient {
    /// Exchange credentials for a user identity and bearer token.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let url = self.collection_url(LOGIN_PATH)?;
        let response: LoginResponse = self.fetch(Method::POST, url, Some(credentials)).await?;
        if response.token.trim().is_empty() {
            return Err(ClientError::Decode("login response carried an empty token".to_string()));
        }
        Ok(response)
    }
}
