//! LibreSpeed HTTP backend

use super::{
    megabits_per_second, ping_and_jitter_from_samples, LatencySample, MeasurementServer,
    TransferOptions, TransferSample,
};
use crate::{
    error::{AppError, Result},
    logging::DiagnosticLog,
    models::{IspInfo, ServerDefinition},
    output::humanize_mbps,
    types::{DistanceUnit, NetworkFamily},
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use rand::RngCore;
use reqwest::Client;
use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::{timeout_at, Instant};
use url::Url;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A LibreSpeed server reached over HTTP
pub struct HttpServer {
    definition: ServerDefinition,
    client: Client,
    log: DiagnosticLog,
}

impl HttpServer {
    /// Create a server handle for a server list entry
    pub fn new(definition: ServerDefinition) -> Result<Self> {
        let client = build_client(None, NetworkFamily::Auto)?;
        Ok(Self {
            definition,
            client,
            log: DiagnosticLog::new(),
        })
    }

    pub fn definition(&self) -> &ServerDefinition {
        &self.definition
    }

    fn endpoint(&self, relative: &str) -> Result<Url> {
        Ok(self.resolve_url()?.join(relative)?)
    }

    fn client_for(&self, source_ip: Option<IpAddr>, network: NetworkFamily) -> Result<Client> {
        if source_ip.is_none() && network == NetworkFamily::Auto {
            return Ok(self.client.clone());
        }
        build_client(source_ip, network)
    }
}

fn build_client(source_ip: Option<IpAddr>, network: NetworkFamily) -> Result<Client> {
    let local_address = source_ip.or(match network {
        NetworkFamily::Auto => None,
        NetworkFamily::Ipv4 => Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        NetworkFamily::Ipv6 => Some(IpAddr::V6(Ipv6Addr::UNSPECIFIED)),
    });

    Client::builder()
        .user_agent(crate::defaults::USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .local_address(local_address)
        .build()
        .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))
}

fn random_payload(size: usize) -> Bytes {
    let mut buf = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut buf);
    Bytes::from(buf)
}

fn rate_text(mbps: f64, options: &TransferOptions) -> String {
    if options.bytes {
        humanize_mbps(mbps, options.binary_base)
    } else {
        format!("{:.2} Mbps", mbps)
    }
}

async fn download_worker(client: Client, url: Url, deadline: Instant, counter: Arc<AtomicU64>) -> Result<()> {
    while Instant::now() < deadline {
        let response = match timeout_at(deadline, client.get(url.clone()).send()).await {
            Err(_) => return Ok(()),
            Ok(result) => result?.error_for_status()?,
        };

        let mut stream = response.bytes_stream();
        loop {
            match timeout_at(deadline, stream.next()).await {
                Err(_) => return Ok(()),
                Ok(None) => break,
                Ok(Some(chunk)) => {
                    counter.fetch_add(chunk?.len() as u64, Ordering::Relaxed);
                }
            }
        }
    }
    Ok(())
}

async fn upload_worker(
    client: Client,
    url: Url,
    deadline: Instant,
    payload: Option<Bytes>,
    size: usize,
    counter: Arc<AtomicU64>,
) -> Result<()> {
    while Instant::now() < deadline {
        let body = match &payload {
            Some(shared) => shared.clone(),
            None => random_payload(size),
        };
        let len = body.len() as u64;

        let request = client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send();

        match timeout_at(deadline, request).await {
            Err(_) => return Ok(()),
            Ok(result) => {
                result?.error_for_status()?;
                counter.fetch_add(len, Ordering::Relaxed);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl MeasurementServer for HttpServer {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn diagnostic_log(&self) -> &DiagnosticLog {
        &self.log
    }

    fn resolve_url(&self) -> Result<Url> {
        self.definition.base_url()
    }

    fn sponsor(&self) -> String {
        self.definition.sponsor()
    }

    async fn is_up(&self) -> bool {
        let Ok(url) = self.endpoint(&self.definition.ping_path) else {
            return false;
        };
        match self.client.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                self.log.warn(&format!("Liveness check failed: {}", e));
                false
            }
        }
    }

    async fn isp_info(&self, unit: DistanceUnit) -> Result<IspInfo> {
        let mut url = self.endpoint(&self.definition.get_ip_path)?;
        url.query_pairs_mut()
            .append_pair("isp", "true")
            .append_pair("distance", unit.as_query_value());

        self.log.verbose(&format!("Fetching IP info from {}", url));
        let body = self
            .client
            .get(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let info = match serde_json::from_str::<IspInfo>(&body) {
            Ok(info) => info,
            Err(_) if !body.trim().is_empty() && !body.trim_start().starts_with('{') => {
                IspInfo::from_plain(body.trim())
            }
            Err(e) => return Err(AppError::parse(format!("Invalid IP info response: {}", e))),
        };
        self.log.log(&format!("IP info: {}", info.processed_string));
        Ok(info)
    }

    async fn ping_and_jitter(
        &self,
        count: u32,
        source_ip: Option<IpAddr>,
        network: NetworkFamily,
    ) -> Result<LatencySample> {
        let client = self.client_for(source_ip, network)?;
        let base = self.endpoint(&self.definition.ping_path)?;
        let mut samples = Vec::with_capacity(count as usize);

        for i in 0..count {
            let mut url = base.clone();
            url.query_pairs_mut().append_pair("r", &i.to_string());

            let start = std::time::Instant::now();
            client
                .get(url)
                .timeout(PROBE_TIMEOUT)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            let rtt_ms = start.elapsed().as_secs_f64() * 1000.0;
            self.log.verbose(&format!("Ping {}: {:.2} ms", i + 1, rtt_ms));
            samples.push(rtt_ms);
        }

        let sample = ping_and_jitter_from_samples(&samples)
            .ok_or_else(|| AppError::validation("Ping count must be greater than 0"))?;
        self.log.log(&format!("Ping: {:.2} ms, jitter: {:.2} ms", sample.ping_ms, sample.jitter_ms));
        Ok(sample)
    }

    async fn download(&self, options: &TransferOptions) -> Result<TransferSample> {
        let client = self.client_for(options.source_ip, options.network)?;
        let mut url = self.endpoint(&self.definition.download_path)?;
        url.query_pairs_mut().append_pair("ckSize", &options.chunks.to_string());

        let counter = Arc::new(AtomicU64::new(0));
        let start = Instant::now();
        let deadline = start + options.max_duration;

        let workers = (0..options.concurrent.max(1)).map(|_| {
            download_worker(client.clone(), url.clone(), deadline, Arc::clone(&counter))
        });
        let results = futures::future::join_all(workers).await;
        results.into_iter().collect::<Result<Vec<()>>>()?;

        let bytes = counter.load(Ordering::Relaxed);
        let mbps = megabits_per_second(bytes, start.elapsed().min(options.max_duration));
        self.log.log(&format!("Download: {} ({} bytes)", rate_text(mbps, options), bytes));
        Ok(TransferSample { mbps, bytes })
    }

    async fn upload(&self, options: &TransferOptions) -> Result<TransferSample> {
        let client = self.client_for(options.source_ip, options.network)?;
        let url = self.endpoint(&self.definition.upload_path)?;
        let size = options.upload_size_kib as usize * 1024;
        let payload = if options.no_pre_allocate {
            None
        } else {
            Some(random_payload(size))
        };

        let counter = Arc::new(AtomicU64::new(0));
        let start = Instant::now();
        let deadline = start + options.max_duration;

        let workers = (0..options.concurrent.max(1)).map(|_| {
            upload_worker(
                client.clone(),
                url.clone(),
                deadline,
                payload.clone(),
                size,
                Arc::clone(&counter),
            )
        });
        let results = futures::future::join_all(workers).await;
        results.into_iter().collect::<Result<Vec<()>>>()?;

        let bytes = counter.load(Ordering::Relaxed);
        let mbps = megabits_per_second(bytes, start.elapsed().min(options.max_duration));
        self.log.log(&format!("Upload: {} ({} bytes)", rate_text(mbps, options), bytes));
        Ok(TransferSample { mbps, bytes })
    }
}
