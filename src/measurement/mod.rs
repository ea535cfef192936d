//! Measurement capability consumed by the test executor
//!
//! The executor only talks to a [`MeasurementServer`]; the transport that
//! produces the numbers lives behind it. [`HttpServer`] is the LibreSpeed
//! HTTP backend, and tests plug in fakes.

pub mod http;

pub use http::HttpServer;

use crate::{
    error::Result,
    logging::DiagnosticLog,
    models::{IspInfo, TestOptions},
    types::{DistanceUnit, NetworkFamily},
};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::Duration;
use url::Url;

/// Latency sample in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    pub ping_ms: f64,
    pub jitter_ms: f64,
}

/// Result of a throughput test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferSample {
    pub mbps: f64,
    pub bytes: u64,
}

/// Parameters shared by the download and upload tests
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Suppress any progress display. Set for library runs and machine-readable
    /// output; `HttpServer` never draws progress, so only backends that do honour it.
    pub silent: bool,
    /// Progress is shown in byte rates
    pub bytes: bool,
    /// Byte rates use 1024 as base
    pub binary_base: bool,
    pub concurrent: u32,
    pub chunks: u32,
    /// Upper bound for the whole transfer test
    pub max_duration: Duration,
    /// Regenerate upload payloads per request
    pub no_pre_allocate: bool,
    pub upload_size_kib: u32,
    pub source_ip: Option<IpAddr>,
    pub network: NetworkFamily,
}

impl TransferOptions {
    pub fn from_options(options: &TestOptions, silent: bool) -> Self {
        Self {
            silent,
            bytes: options.bytes,
            binary_base: options.binary_base,
            concurrent: options.concurrent,
            chunks: options.chunks,
            max_duration: options.duration(),
            no_pre_allocate: options.no_pre_allocate,
            upload_size_kib: options.upload_size_kib,
            source_ip: options.source_ip,
            network: options.network,
        }
    }
}

/// One measurement endpoint
#[async_trait]
pub trait MeasurementServer: Send + Sync {
    /// Display name of the server
    fn name(&self) -> &str;

    /// Diagnostic sink whose text is attached to telemetry
    fn diagnostic_log(&self) -> &DiagnosticLog;

    /// Canonical server URL
    fn resolve_url(&self) -> Result<Url>;

    /// Sponsor line, empty when there is none
    fn sponsor(&self) -> String;

    /// Advisory liveness check
    async fn is_up(&self) -> bool;

    /// ISP and location of the client as seen by the server
    async fn isp_info(&self, unit: DistanceUnit) -> Result<IspInfo>;

    /// Sample latency and jitter with `count` probes
    async fn ping_and_jitter(
        &self,
        count: u32,
        source_ip: Option<IpAddr>,
        network: NetworkFamily,
    ) -> Result<LatencySample>;

    async fn download(&self, options: &TransferOptions) -> Result<TransferSample>;

    async fn upload(&self, options: &TransferOptions) -> Result<TransferSample>;
}

/// Mean of the samples and mean absolute difference of consecutive samples
pub fn ping_and_jitter_from_samples(samples: &[f64]) -> Option<LatencySample> {
    if samples.is_empty() {
        return None;
    }

    let ping_ms = samples.iter().sum::<f64>() / samples.len() as f64;
    let jitter_ms = if samples.len() < 2 {
        0.0
    } else {
        let total: f64 = samples.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        total / (samples.len() - 1) as f64
    };

    Some(LatencySample { ping_ms, jitter_ms })
}

/// Megabits per second for `bytes` moved in `elapsed`
pub fn megabits_per_second(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / 1_000_000.0 / secs
}
