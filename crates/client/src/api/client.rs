//! Authenticated API client.
//!
//! Every request goes through the same pipeline: allow-list check, fresh
//! session read, bearer attachment, proactive refresh when the token nears
//! expiry, and a single refresh-and-retry when the backend answers `401`.
//! Refreshes are single-flight through [`RefreshCoordinator`]; requests that
//! discover one in flight queue behind it instead of racing it.

use std::sync::Arc;

use circle_common::{CredentialStore, Session};
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::errors::ApiError;
use crate::api::refresh::{RefreshCoordinator, RefreshOutcome, RefreshTicket};
use crate::api::request::{ApiResponse, FormPayload, RequestBody, RequestDescriptor};
use crate::api::types::{ApiEnvelope, RefreshData};
use crate::config::ClientConfig;
use crate::http::HttpClient;

/// Paths that never carry a token and never trigger a refresh check, even
/// when a stale token is stored.
const EXEMPT_PATHS: &[&str] = &[
    "/account/login",
    "/account/register",
    "/account/resend-verification",
    "/account/refresh",
];

const REFRESH_PATH: &str = "/account/refresh";

type SessionExpiredHook = Box<dyn Fn() + Send + Sync>;

/// HTTP client with transparent token refresh.
pub struct ApiClient {
    http: HttpClient,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator,
    session_expired: Mutex<Option<SessionExpiredHook>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ApiError> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            store,
            refresh: RefreshCoordinator::new(),
            session_expired: Mutex::new(None),
        })
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The credential store this client reads the session from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Register a callback fired when a refresh fails and the session is
    /// torn down. The hosting application decides what "go to login" means;
    /// the client never controls navigation itself.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.session_expired.lock() = Some(Box::new(hook));
    }

    /// Issue a request through the authentication pipeline.
    ///
    /// Responses are returned whatever their status; only transport errors
    /// and refresh failures surface as `Err`. A first `401` triggers one
    /// refresh and one retry of the identical descriptor; whatever the retry
    /// returns is final.
    ///
    /// # Errors
    /// Returns `ApiError::Config` for an empty path, `ApiError::Network`/
    /// `ApiError::Timeout` for transport failures, and
    /// `ApiError::RefreshFailed` when a needed refresh fails.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        if descriptor.path.is_empty() {
            return Err(ApiError::Config("request path must not be empty".to_string()));
        }

        if is_exempt(&descriptor.path) {
            debug!(path = %descriptor.path, "dispatching unauthenticated request");
            return self.send(&descriptor, None).await;
        }

        if self.store.should_refresh().await {
            self.ensure_fresh_token().await?;
        }

        let bearer = self.bearer().await;
        let response = self.send(&descriptor, bearer.as_deref()).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // One refresh and one retry per originating request. The retry's
        // result is final, even if it is another 401.
        debug!(path = %descriptor.path, "401 received, refreshing and retrying once");
        let fresh = self.ensure_fresh_token().await?;
        self.send(&descriptor, Some(&fresh)).await
    }

    // ---- typed helpers ----------------------------------------------------

    /// GET a JSON payload.
    ///
    /// # Errors
    /// Non-2xx statuses are classified into `ApiError` by status code.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_json(RequestDescriptor::get(path)).await
    }

    /// POST a JSON body, expect a JSON payload.
    ///
    /// # Errors
    /// See [`get_json`](Self::get_json); serialization failures are
    /// `ApiError::Config`.
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serialize_body(body)?;
        self.execute_json(RequestDescriptor::post(path).json(value)).await
    }

    /// PUT a JSON body, expect a JSON payload.
    ///
    /// # Errors
    /// See [`post_json`](Self::post_json).
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let value = serialize_body(body)?;
        self.execute_json(RequestDescriptor::put(path).json(value)).await
    }

    /// DELETE, expect a JSON payload.
    ///
    /// # Errors
    /// See [`get_json`](Self::get_json).
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute_json(RequestDescriptor::delete(path)).await
    }

    /// POST a multipart form, expect a JSON payload.
    ///
    /// # Errors
    /// See [`get_json`](Self::get_json).
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: FormPayload,
    ) -> Result<T, ApiError> {
        self.execute_json(RequestDescriptor::post(path).form(form)).await
    }

    pub(crate) async fn execute_json<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let response = self.request(descriptor).await?;
        if !response.is_success() {
            return Err(map_status(response.status, response.text()));
        }
        response.json()
    }

    // ---- refresh protocol -------------------------------------------------

    /// Single-flight entry point: lead one refresh cycle or wait for the
    /// in-flight one. Both paths resolve to the new access token.
    async fn ensure_fresh_token(&self) -> Result<String, ApiError> {
        match self.refresh.begin() {
            RefreshTicket::Leader => self.lead_refresh().await,
            RefreshTicket::Waiter { rx, position } => {
                debug!(position, "refresh already in flight, queueing request");
                match rx.await {
                    Ok(RefreshOutcome::Refreshed(token)) => Ok(token),
                    Ok(RefreshOutcome::Failed(message)) => Err(ApiError::RefreshFailed(message)),
                    Err(_) => {
                        Err(ApiError::RefreshFailed("refresh cycle abandoned".to_string()))
                    }
                }
            }
        }
    }

    async fn lead_refresh(&self) -> Result<String, ApiError> {
        match self.call_refresh_endpoint().await {
            Ok(data) => {
                // Keep whatever profile payload the login cached.
                let user_info = self.store.session().await.and_then(|s| s.user_info);
                let session = Session::new(data.token.clone(), Some(data.expires_at), user_info);
                if !self.store.set_session(session).await {
                    warn!("refreshed token could not be persisted to the credential store");
                }
                info!("access token refreshed");
                self.refresh.settle(RefreshOutcome::Refreshed(data.token.clone()));
                Ok(data.token)
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, tearing down session");
                if !self.store.clear_session().await {
                    warn!("credential store could not be cleared after refresh failure");
                }
                let message = match err {
                    ApiError::RefreshFailed(message) => message,
                    other => other.to_string(),
                };
                self.refresh.settle(RefreshOutcome::Failed(message.clone()));
                self.notify_session_expired();
                Err(ApiError::RefreshFailed(message))
            }
        }
    }

    /// One call to the refresh endpoint, carrying the current (possibly
    /// stale) token and nothing else. Goes straight to the transport: the
    /// refresh call never re-enters the retry pipeline.
    async fn call_refresh_endpoint(&self) -> Result<RefreshData, ApiError> {
        let token = self.store.token().await;
        let descriptor = RequestDescriptor::post(REFRESH_PATH);
        let response = self.send(&descriptor, token.as_deref()).await?;

        if !response.is_success() {
            return Err(ApiError::RefreshFailed(format!(
                "refresh endpoint returned {}: {}",
                response.status,
                response.text()
            )));
        }

        let envelope: ApiEnvelope<RefreshData> = response.json()?;
        if !envelope.success {
            return Err(ApiError::RefreshFailed(envelope.message));
        }
        envelope.data.ok_or_else(|| {
            ApiError::RefreshFailed("refresh response missing token payload".to_string())
        })
    }

    fn notify_session_expired(&self) {
        let hook = self.session_expired.lock();
        if let Some(hook) = hook.as_ref() {
            hook();
        }
    }

    // ---- transport --------------------------------------------------------

    async fn bearer(&self) -> Option<String> {
        match self.store.session().await {
            Some(session) if session.is_authenticated() => Some(session.access_token),
            _ => None,
        }
    }

    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint(&descriptor.path);
        let mut request = self.http.request(descriptor.method.clone(), &url);

        for (name, value) in &descriptor.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(token) = bearer {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"));
        }

        request = match &descriptor.body {
            Some(RequestBody::Json(value)) => request.json(value),
            Some(RequestBody::Form(form)) => request.multipart(form.clone().into_multipart()?),
            None => request,
        };

        let response = self.http.send(request).await?;
        ApiResponse::from_reqwest(response).await
    }
}

fn serialize_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Config(format!("failed to serialize request body: {err}")))
}

fn is_exempt(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    EXEMPT_PATHS.contains(&path)
}

fn map_status(status: StatusCode, body: String) -> ApiError {
    let message = if body.is_empty() { status.to_string() } else { body };

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Auth(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::RateLimit(message)
    } else if status.is_server_error() {
        ApiError::Server(message)
    } else {
        ApiError::Client(message)
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the API client.
    ///
    /// # Errors
    /// Returns an error if the store is missing or the transport cannot be
    /// constructed.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let store = self
            .store
            .ok_or_else(|| ApiError::Config("credential store not set".to_string()))?;
        ApiClient::new(config, store)
    }
}
