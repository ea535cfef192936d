//! Shared fake measurement server for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use librespeed_rs::{
    error::{AppError, Result},
    logging::DiagnosticLog,
    measurement::{LatencySample, MeasurementServer, TransferOptions, TransferSample},
    models::IspInfo,
    types::{DistanceUnit, NetworkFamily},
};
use std::net::IpAddr;
use std::sync::Mutex;
use url::Url;

/// Capability step a fake server can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    ResolveUrl,
    IspInfo,
    Ping,
    Download,
    Upload,
}

pub struct FakeServer {
    pub name: String,
    pub url: String,
    pub sponsor: String,
    pub up: bool,
    pub ping_ms: f64,
    pub jitter_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub fail_at: Option<FailAt>,
    calls: Mutex<Vec<&'static str>>,
    log: DiagnosticLog,
}

impl FakeServer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("https://{}.speed.example.net/", name.to_lowercase()),
            sponsor: String::new(),
            up: true,
            ping_ms: 12.344,
            jitter_ms: 1.234,
            download_mbps: 250.556,
            upload_mbps: 99.994,
            fail_at: None,
            calls: Mutex::new(Vec::new()),
            log: DiagnosticLog::new(),
        }
    }

    pub fn failing_at(name: &str, step: FailAt) -> Self {
        let mut server = Self::new(name);
        server.fail_at = Some(step);
        server
    }

    pub fn with_ping(mut self, ping_ms: f64) -> Self {
        self.ping_ms = ping_ms;
        self
    }

    /// Capability methods called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.calls().contains(&method)
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }

    fn check(&self, step: FailAt) -> Result<()> {
        if self.fail_at == Some(step) {
            return Err(AppError::network(format!("{:?} injected failure", step)));
        }
        Ok(())
    }
}

#[async_trait]
impl MeasurementServer for FakeServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn diagnostic_log(&self) -> &DiagnosticLog {
        &self.log
    }

    fn resolve_url(&self) -> Result<Url> {
        self.record("resolve_url");
        self.check(FailAt::ResolveUrl)?;
        Ok(Url::parse(&self.url)?)
    }

    fn sponsor(&self) -> String {
        self.sponsor.clone()
    }

    async fn is_up(&self) -> bool {
        self.record("is_up");
        self.up
    }

    async fn isp_info(&self, _unit: DistanceUnit) -> Result<IspInfo> {
        self.record("isp_info");
        self.check(FailAt::IspInfo)?;
        let mut info = IspInfo::from_plain("198.51.100.20");
        info.raw_isp_info.readme = "server side note".to_string();
        Ok(info)
    }

    async fn ping_and_jitter(
        &self,
        _count: u32,
        _source_ip: Option<IpAddr>,
        _network: NetworkFamily,
    ) -> Result<LatencySample> {
        self.record("ping_and_jitter");
        self.check(FailAt::Ping)?;
        self.log.log("ping sampled");
        Ok(LatencySample {
            ping_ms: self.ping_ms,
            jitter_ms: self.jitter_ms,
        })
    }

    async fn download(&self, _options: &TransferOptions) -> Result<TransferSample> {
        self.record("download");
        self.check(FailAt::Download)?;
        Ok(TransferSample {
            mbps: self.download_mbps,
            bytes: 31_319_375,
        })
    }

    async fn upload(&self, _options: &TransferOptions) -> Result<TransferSample> {
        self.record("upload");
        self.check(FailAt::Upload)?;
        Ok(TransferSample {
            mbps: self.upload_mbps,
            bytes: 12_499_250,
        })
    }
}
