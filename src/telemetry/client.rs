use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

use crate::config::TelemetryConfig;

use super::{DoorState, StateSink, TelemetryError};

/// ThingSpeak update payload, sent as URL query parameters.
#[derive(Serialize)]
struct UpdatePayload<'a> {
    api_key: &'a str,
    field1: u8,
}

/// HTTP client for the ThingSpeak update endpoint.
pub struct TelemetryClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl TelemetryClient {
    pub fn new(config: &TelemetryConfig) -> Result<Self, TelemetryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl StateSink for TelemetryClient {
    async fn report(&self, state: DoorState) -> Result<(), TelemetryError> {
        let payload = UpdatePayload {
            api_key: &self.api_key,
            field1: state.field_value(),
        };

        let response = self
            .http
            .get(&self.endpoint)
            .query(&payload)
            .send()
            .await?;

        // ThingSpeak signals success with a bare 200; anything else is a
        // rejection regardless of body.
        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(TelemetryError::Status(status)),
        }
    }
}
