//! HTTP access to the review API.
//!
//! Every request passes through the configured request stages before it is
//! sent, and every response status passes through the response stages before
//! the body is read. The standard pair attaches the session's bearer token
//! and tears the session down on a 401.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::Sector,
    error::ApiErrorBody,
    protocol::{
        endpoints, ApiEnvelope, CompanyFilterRequest, CompanyPage, LoginData, LoginQuery,
        RegisterRequest,
    },
};
use tracing::{debug, info, warn};

use crate::{
    config::{normalize_base_url, ClientSettings},
    navigation::{Navigator, LOGIN_PATH},
    session::SessionStore,
    ClientError, CompanyDirectory, SectorDirectory,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Unauthorized,
    ClientError(u16),
    ServerError(u16),
}

pub fn classify_status(status: StatusCode) -> ResponseClass {
    if status == StatusCode::UNAUTHORIZED {
        ResponseClass::Unauthorized
    } else if status.is_client_error() {
        ResponseClass::ClientError(status.as_u16())
    } else if status.is_server_error() {
        ResponseClass::ServerError(status.as_u16())
    } else {
        ResponseClass::Success
    }
}

pub trait RequestStage: Send + Sync {
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder;
}

pub trait ResponseStage: Send + Sync {
    fn inspect(&self, class: ResponseClass);
}

pub struct CredentialAttachment {
    session: Arc<SessionStore>,
}

impl CredentialAttachment {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

impl RequestStage for CredentialAttachment {
    fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Clears the session and sends the user to the login view when the API
/// answers 401. Already being on the login view means the 401 is the login
/// attempt itself failing, which the login form reports on its own.
pub struct UnauthorizedTeardown {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedTeardown {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ResponseStage for UnauthorizedTeardown {
    fn inspect(&self, class: ResponseClass) {
        if class != ResponseClass::Unauthorized {
            return;
        }
        if self.navigator.current_path() == LOGIN_PATH {
            return;
        }
        warn!("transport: unauthorized response, ending session");
        self.session.logout();
        self.navigator.push(LOGIN_PATH, None);
    }
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

impl ApiClient {
    /// Bare client with no stages.
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(&settings.api_base_url),
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        })
    }

    /// Client wired with credential attachment and 401 teardown for `session`.
    pub fn with_session(
        settings: &ClientSettings,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(settings)?
            .with_request_stage(Arc::new(CredentialAttachment::new(session.clone())))
            .with_response_stage(Arc::new(UnauthorizedTeardown::new(session, navigator))))
    }

    pub fn with_request_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.request_stages.push(stage);
        self
    }

    pub fn with_response_stage(mut self, stage: Arc<dyn ResponseStage>) -> Self {
        self.response_stages.push(stage);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn login(&self, credentials: &LoginQuery) -> Result<LoginData, ClientError> {
        let request = self
            .http
            .post(self.url(endpoints::AUTH_LOGIN))
            .query(credentials);
        self.execute(endpoints::AUTH_LOGIN, request).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let request = self.http.post(self.url(endpoints::AUTH_LOGOUT));
        self.execute_unit(endpoints::AUTH_LOGOUT, request).await
    }

    pub async fn register(&self, body: &RegisterRequest) -> Result<(), ClientError> {
        let request = self.http.post(self.url(endpoints::AUTH_REGISTER)).json(body);
        self.execute_unit(endpoints::AUTH_REGISTER, request).await
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<String, ClientError> {
        let request = self
            .request_stages
            .iter()
            .fold(request, |request, stage| stage.prepare(request));

        debug!(endpoint, "transport: sending request");
        let response = request.send().await.map_err(|err| {
            warn!(endpoint, "transport: request failed: {err}");
            ClientError::from(err)
        })?;

        let status = response.status();
        let class = classify_status(status);
        for stage in &self.response_stages {
            stage.inspect(class);
        }

        let body = response.text().await?;
        info!(endpoint, status = status.as_u16(), "transport: response");

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: ApiErrorBody::message_from(&body),
            });
        }
        Ok(body)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let body = self.send(endpoint, request).await?;
        let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
            .map_err(|err| ClientError::InvalidResponse(format!("{endpoint}: {err}")))?;
        if !envelope.success {
            return Err(ClientError::rejected(envelope.message));
        }
        envelope
            .data
            .ok_or_else(|| ClientError::rejected(envelope.message))
    }

    /// For endpoints whose success carries no data. A 2xx with an empty or
    /// non-envelope body counts as success; an envelope saying otherwise does not.
    async fn execute_unit(&self, endpoint: &str, request: RequestBuilder) -> Result<(), ClientError> {
        let body = self.send(endpoint, request).await?;
        match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body) {
            Ok(envelope) if !envelope.success => Err(ClientError::rejected(envelope.message)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CompanyDirectory for ApiClient {
    async fn filter_companies(
        &self,
        request: CompanyFilterRequest,
    ) -> Result<CompanyPage, ClientError> {
        let builder = self
            .http
            .post(self.url(endpoints::COMPANY_FILTER))
            .json(&request);
        self.execute(endpoints::COMPANY_FILTER, builder).await
    }
}

#[async_trait]
impl SectorDirectory for ApiClient {
    async fn fetch_sectors(&self) -> Result<Vec<Sector>, ClientError> {
        let builder = self.http.get(self.url(endpoints::SECTORS));
        self.execute(endpoints::SECTORS, builder).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
