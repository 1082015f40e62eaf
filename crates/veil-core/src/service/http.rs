//! JSON-over-HTTPS account service client.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    AccountService, MutationOutcome, PasswordChange, PasswordRemoval, ServiceError, ServiceResult,
};
use crate::models::{PasswordState, PrivacyKey, PrivacyRule};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const HTTP_TIMEOUT_SECS: u64 = 10;

/// Bearer token for the signed-in account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> ServiceResult<Self> {
        normalize_text_option(Some(token.into()))
            .map(Self)
            .ok_or_else(|| {
                ServiceError::InvalidConfiguration("access token must not be empty".to_string())
            })
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("AccessToken([REDACTED])")
    }
}

#[derive(Clone)]
pub struct HttpAccountService {
    base_url: String,
    token: AccessToken,
    client: Client,
}

impl HttpAccountService {
    pub fn new(base_url: impl AsRef<str>, token: AccessToken) -> ServiceResult<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            token,
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token.0)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ServiceResult<T> {
        let response = self.authorized(request).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api(parse_api_error(status, &body)));
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|error| {
            ServiceError::InvalidPayload(format!("{error}: {}", compact_text(&body)))
        })
    }
}

#[async_trait]
impl AccountService for HttpAccountService {
    async fn fetch_password_state(&self) -> ServiceResult<PasswordState> {
        let url = format!("{}/v1/account/password", self.base_url);
        self.send(self.client.get(url)).await
    }

    async fn fetch_privacy_rule(&self, key: PrivacyKey) -> ServiceResult<PrivacyRule> {
        let url = format!("{}/v1/account/privacy/{}", self.base_url, key.as_str());
        self.send(self.client.get(url)).await
    }

    async fn submit_password_change(
        &self,
        params: PasswordChange,
    ) -> ServiceResult<MutationOutcome> {
        let url = format!("{}/v1/account/password", self.base_url);
        let response: OutcomeResponse = self.send(self.client.post(url).json(&params)).await?;
        Ok(response.outcome)
    }

    async fn submit_password_removal(
        &self,
        params: PasswordRemoval,
    ) -> ServiceResult<MutationOutcome> {
        let url = format!("{}/v1/account/password/remove", self.base_url);
        let response: OutcomeResponse = self.send(self.client.post(url).json(&params)).await?;
        Ok(response.outcome)
    }

    fn clear_unconfirmed_password(&self) {
        // Unconfirmed passwords expire server-side; nothing to send.
        tracing::debug!("Clearing unconfirmed password locally");
    }
}

#[derive(Debug, Deserialize)]
struct OutcomeResponse {
    outcome: MutationOutcome,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub fn normalize_base_url(url: &str) -> ServiceResult<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(ServiceError::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
