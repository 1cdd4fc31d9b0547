//! Account and authentication endpoints.
//!
//! Login is the one endpoint with a side effect on the credential store: a
//! successful response carrying a token becomes the stored session. Logout
//! clears the store whatever the backend answered; a dead local session must
//! not survive a flaky revocation call.

use circle_common::Session;
use tracing::warn;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::request::RequestDescriptor;
use crate::api::types::{
    ApiEnvelope, LoginData, LoginRequest, ProfileData, RegisterData, RegisterRequest,
    ResendVerificationData, ResendVerificationRequest,
};

/// Typed account endpoints.
pub struct AccountApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Access the account endpoints.
    #[must_use]
    pub fn account(&self) -> AccountApi<'_> {
        AccountApi { client: self }
    }
}

impl AccountApi<'_> {
    /// Register a new user.
    ///
    /// # Errors
    /// Classified per status; see [`ApiClient::get_json`].
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<ApiEnvelope<RegisterData>, ApiError> {
        self.client.post_json("/account/register", request).await
    }

    /// Log in and persist the returned session.
    ///
    /// # Errors
    /// Classified per status. A 401 here never triggers a refresh: the login
    /// path is exempt from all token logic.
    pub async fn login(&self, request: &LoginRequest) -> Result<ApiEnvelope<LoginData>, ApiError> {
        let envelope: ApiEnvelope<LoginData> =
            self.client.post_json("/account/login", request).await?;

        if envelope.success {
            if let Some(data) = &envelope.data {
                if let Some(token) = &data.token {
                    let user_info = serde_json::to_value(data).ok();
                    let session = Session::new(token.clone(), data.expires_at, user_info);
                    if !self.client.store().set_session(session).await {
                        warn!("login succeeded but the session could not be persisted");
                    }
                }
            }
        }

        Ok(envelope)
    }

    /// Resend the verification email.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn resend_verification(
        &self,
        email: &str,
    ) -> Result<ApiEnvelope<ResendVerificationData>, ApiError> {
        let request = ResendVerificationRequest { email: email.to_string() };
        self.client.post_json("/account/resend-verification", &request).await
    }

    /// Revoke the current token and clear the local session.
    ///
    /// # Errors
    /// Classified per status. The local session is cleared even on error.
    pub async fn logout(&self) -> Result<ApiEnvelope<serde_json::Value>, ApiError> {
        let result = self
            .client
            .execute_json(RequestDescriptor::post("/account/logout"))
            .await;

        if !self.client.store().clear_session().await {
            warn!("session could not be cleared on logout");
        }

        result
    }

    /// Fetch the current user's profile.
    ///
    /// # Errors
    /// Classified per status.
    pub async fn profile(&self) -> Result<ApiEnvelope<ProfileData>, ApiError> {
        self.client.get_json("/account/profile").await
    }
}
