//! REST client for the auth and stock endpoints.
//!
//! Requests are made once; failures are returned to the caller, which decides
//! how to surface them. Nothing here retries.

use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::constants::{CHART_DATA_PATH, SIDEBAR_PATH, SIGNIN_PATH, SIGNUP_PATH};
use crate::error::{Error, Result};
use crate::logging;
use crate::quote::{Candle, ChartPayload, SidebarSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    pub encoded_token: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
    pub firstname: String,
    pub lastname: String,
    pub mobile: String,
    pub email: String,
    pub password: String,
}

/// Free-form acknowledgement returned by endpoints without a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the chart-data request: instrument token plus symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRequest {
    pub token: Option<String>,
    pub symbol: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    bearer: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(base_url)?,
            bearer: None,
        })
    }

    /// Attach the session token as a bearer credential.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse> {
        let url = self.endpoint(SIGNIN_PATH)?;
        let response = self.http.post(url).json(request).send().await?;
        read_json(SIGNIN_PATH, response).await
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<ApiMessage> {
        let url = self.endpoint(SIGNUP_PATH)?;
        let response = self.http.post(url).json(request).send().await?;
        let body = read_text(SIGNUP_PATH, response).await?;
        if body.trim().is_empty() {
            return Ok(ApiMessage::default());
        }
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    pub async fn sidebar(&self) -> Result<SidebarSummary> {
        let url = self.endpoint(SIDEBAR_PATH)?;
        let response = self.authorize(self.http.get(url)).send().await?;
        read_json(SIDEBAR_PATH, response).await
    }

    /// Historical candles for one instrument, oldest first as served.
    pub async fn chart_data(&self, request: &ChartRequest) -> Result<Vec<Candle>> {
        let url = self.endpoint(CHART_DATA_PATH)?;
        logging::info(
            "api.chart_data",
            "Fetching chart data",
            json!({ "symbol": request.symbol }),
        );
        let response = self
            .authorize(self.http.post(url))
            .json(request)
            .send()
            .await?;
        let payload: ChartPayload = read_json(CHART_DATA_PATH, response).await?;
        Ok(payload.into_candles())
    }
}

async fn read_text(path: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    logging::warn(
        "api.status",
        "Request rejected by server",
        json!({ "path": path, "status": status.as_u16(), "message": message }),
    );
    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T>(path: &str, response: Response) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let body = read_text(path, response).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Pull a human-readable reason out of an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        assert_eq!(
            error_message(r#"{"message":"Invalid credentials","error":"x"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(error_message(r#"{"error":"nope"}"#).as_deref(), Some("nope"));
        assert!(error_message("plain text").is_none());
    }

    #[test]
    fn endpoint_joins_absolute_paths() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(
            client.endpoint(SIDEBAR_PATH).unwrap().as_str(),
            "http://localhost:8000/api/stocks/sidebar"
        );
    }

    #[test]
    fn chart_request_serialises_token_and_symbol() {
        let body = serde_json::to_value(ChartRequest {
            token: Some("11536".into()),
            symbol: "TCS".into(),
        })
        .unwrap();
        assert_eq!(body, json!({ "token": "11536", "symbol": "TCS" }));
    }
}
