//! Per-server test report and its CSV projection

use crate::models::isp::{IpInfoResponse, IspInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use url::Url;

/// Round to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Identity of the tested endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub url: String,
}

/// Client ISP/location information, with the `readme` field always cleared
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IpInfoResponse", into = "IpInfoResponse")]
pub struct ClientInfo(IpInfoResponse);

impl ClientInfo {
    pub fn from_isp_info(isp: &IspInfo) -> Self {
        Self::from(isp.raw_isp_info.clone())
    }
}

impl From<IpInfoResponse> for ClientInfo {
    fn from(mut raw: IpInfoResponse) -> Self {
        raw.readme.clear();
        Self(raw)
    }
}

impl From<ClientInfo> for IpInfoResponse {
    fn from(client: ClientInfo) -> Self {
        client.0
    }
}

impl Deref for ClientInfo {
    type Target = IpInfoResponse;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Result of one server's test sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub server: ServerInfo,
    pub client: ClientInfo,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub ping: f64,
    pub jitter: f64,
    pub upload: f64,
    pub download: f64,
    pub share: String,
}

/// Raw numbers gathered for one server before rounding
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    pub ping: f64,
    pub jitter: f64,
    pub download: f64,
    pub upload: f64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

impl Report {
    /// Build the report for a completed server run. Rounding happens here and only here.
    pub fn new(
        server_name: &str,
        server_url: &Url,
        isp: &IspInfo,
        measurements: &Measurements,
        share: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            server: ServerInfo {
                name: server_name.to_string(),
                url: server_url.to_string(),
            },
            client: ClientInfo::from_isp_info(isp),
            bytes_sent: measurements.bytes_sent,
            bytes_received: measurements.bytes_received,
            ping: round2(measurements.ping),
            jitter: round2(measurements.jitter),
            upload: round2(measurements.upload),
            download: round2(measurements.download),
            share,
        }
    }

    /// Project this report onto a CSV row
    pub fn flat(&self) -> FlatReport {
        FlatReport {
            timestamp: self.timestamp,
            name: self.server.name.clone(),
            address: self.server.url.clone(),
            ping: self.ping,
            jitter: self.jitter,
            download: self.download,
            upload: self.upload,
            bytes_received: self.bytes_received,
            bytes_sent: self.bytes_sent,
            share: self.share.clone(),
            ip: self.client.ip.clone(),
        }
    }
}

/// CSV row of a [`Report`], in fixed column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatReport {
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Server Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Ping")]
    pub ping: f64,
    #[serde(rename = "Jitter")]
    pub jitter: f64,
    #[serde(rename = "Download")]
    pub download: f64,
    #[serde(rename = "Upload")]
    pub upload: f64,
    #[serde(rename = "Bytes Received")]
    pub bytes_received: u64,
    #[serde(rename = "Bytes Sent")]
    pub bytes_sent: u64,
    #[serde(rename = "Share")]
    pub share: String,
    #[serde(rename = "IP")]
    pub ip: String,
}

impl FlatReport {
    pub const HEADERS: [&'static str; 11] = [
        "Timestamp",
        "Server Name",
        "Address",
        "Ping",
        "Jitter",
        "Download",
        "Upload",
        "Bytes Received",
        "Bytes Sent",
        "Share",
        "IP",
    ];
}
