//! Telemetry client
//!
//! Submits a finished server run to a LibreSpeed results endpoint as a
//! multipart form and turns the reply into a shareable result URL.

use crate::{
    error::{AppError, Result},
    logging::Logger,
    models::{IspInfo, TelemetryExtra, TelemetryServer},
};
use reqwest::{multipart::Form, Client};
use std::time::Duration;
use url::Url;

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// The four rounded metrics that are submitted
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryMetrics {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub jitter: f64,
}

/// Everything attached to one submission
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub isp: &'a IspInfo,
    pub metrics: TelemetryMetrics,
    pub log: String,
    pub extra: TelemetryExtra,
}

/// HTTP client for result submission
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
}

impl TelemetryClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::defaults::USER_AGENT)
            .timeout(SUBMIT_TIMEOUT)
            .build()
            .map_err(|e| AppError::telemetry(format!("Failed to create telemetry client: {}", e)))?;
        Ok(Self { client })
    }

    /// Encode a submission as a multipart form
    pub fn build_form(submission: &Submission<'_>) -> Result<Form> {
        let isp = serde_json::to_string(submission.isp)
            .map_err(|e| AppError::telemetry(format!("Failed to encode ispinfo: {}", e)))?;
        let extra = serde_json::to_string(&submission.extra)
            .map_err(|e| AppError::telemetry(format!("Failed to encode extra: {}", e)))?;
        let m = submission.metrics;

        Ok(Form::new()
            .text("ispinfo", isp)
            .text("dl", format!("{:.2}", m.download))
            .text("ul", format!("{:.2}", m.upload))
            .text("ping", format!("{:.2}", m.ping))
            .text("jitter", format!("{:.2}", m.jitter))
            .text("log", submission.log.clone())
            .text("extra", extra))
    }

    /// Post a submission and return the share URL for it
    pub async fn submit(
        &self,
        target: &TelemetryServer,
        submission: &Submission<'_>,
        logger: &Logger,
    ) -> Result<Url> {
        let endpoint = target.endpoint_url()?;
        let share_base = target.share_url()?;
        let form = Self::build_form(submission)?;

        logger
            .debug("Submitting telemetry")
            .field("endpoint", endpoint.as_str())
            .field("level", target.level().to_string())
            .log();

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::telemetry(format!("Telemetry request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::telemetry(format!("Failed to read telemetry response: {}", e)))?;

        if !status.is_success() {
            return Err(AppError::telemetry(format!(
                "Telemetry server returned HTTP {}: {}",
                status, body
            )));
        }

        let id = parse_response(&body)?;
        Ok(share_link(share_base, &id))
    }
}

/// Extract the result id from a `"<token> <id>"` reply
pub fn parse_response(body: &str) -> Result<String> {
    let tokens: Vec<&str> = body.trim().split(' ').collect();
    match tokens.as_slice() {
        [_, id] if !id.is_empty() => Ok((*id).to_string()),
        _ => Err(AppError::InvalidTelemetryResponse(body.to_string())),
    }
}

/// Set or overwrite the `id` query parameter of the share URL
pub fn share_link(mut share_url: Url, id: &str) -> Url {
    let kept: Vec<(String, String)> = share_url
        .query_pairs()
        .filter(|(key, _)| key != "id")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    share_url
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("id", id);
    share_url
}
