//! Speed test executor
//!
//! Runs the per-server test sequence against every configured server in
//! order. The sequence is shared by the interactive command line path and the
//! library path; [`RunMode`] decides whether anything is written out.
//!
//! Any failure while resolving the server, looking up ISP info, sampling
//! latency or running an enabled transfer test aborts the whole run and no
//! reports are returned. Liveness and telemetry failures are only logged.

use crate::{
    error::{AppError, MeasurementPhase, PhaseContext, Result},
    logging::Logger,
    measurement::{MeasurementServer, TransferOptions},
    models::{round2, IspInfo, Measurements, Report, TelemetryExtra, TestOptions},
    output::OutputCoordinator,
    telemetry::{Submission, TelemetryClient, TelemetryMetrics},
};
use std::io::Write;
use std::time::Instant;

/// Where a run sends its human-facing output
pub enum RunMode<'w> {
    /// Progress logging plus rendered results written to the sink
    Interactive(&'w mut dyn Write),
    /// No output; reports are returned to the caller
    Library,
}

impl RunMode<'_> {
    pub fn is_interactive(&self) -> bool {
        matches!(self, RunMode::Interactive(_))
    }
}

/// Executes speed tests for one run configuration
pub struct SpeedTestExecutor<'a> {
    options: &'a TestOptions,
    logger: &'a Logger,
    telemetry: Option<TelemetryClient>,
    output: OutputCoordinator,
}

impl<'a> SpeedTestExecutor<'a> {
    pub fn new(options: &'a TestOptions, logger: &'a Logger) -> Self {
        let telemetry = if options.telemetry_level().is_enabled() {
            match TelemetryClient::new() {
                Ok(client) => Some(client),
                Err(e) => {
                    logger
                        .warn("Telemetry disabled for this run")
                        .error_info(&e)
                        .log();
                    None
                }
            }
        } else {
            None
        };

        Self {
            options,
            logger,
            telemetry,
            output: OutputCoordinator::from_options(options),
        }
    }

    /// Test every server in order and collect one report per server
    pub async fn run<S: MeasurementServer>(&self, servers: &[S], mode: RunMode<'_>) -> Result<Vec<Report>> {
        if servers.is_empty() {
            return Err(AppError::config("No servers to test"));
        }

        let interactive = mode.is_interactive();
        let mut sink = match mode {
            RunMode::Interactive(out) => Some(out),
            RunMode::Library => None,
        };

        let started = Instant::now();
        if servers.len() > 1 {
            let message = format!("Testing against {} servers", servers.len());
            if interactive {
                self.logger.info(&message).log();
            } else {
                self.logger.debug(&message).log();
            }
        }

        let mut reports = Vec::with_capacity(servers.len());
        for (index, server) in servers.iter().enumerate() {
            let report = self.test_server(server, interactive).await?;

            if let Some(out) = sink.as_deref_mut() {
                if let Some(text) = self.output.server_result(&report) {
                    writeln!(out, "{}", text)?;
                }
                if servers.len() > 1 && index + 1 < servers.len() {
                    if let Some(separator) = self.output.separator() {
                        writeln!(out, "{}", separator)?;
                    }
                }
            }

            reports.push(report);
        }

        if let Some(out) = sink.as_deref_mut() {
            if let Some(text) = self.output.final_output(&reports, self.logger) {
                write!(out, "{}", text)?;
            }
            out.flush()?;

            self.logger
                .info(&format!(
                    "Completed {} server test(s) in {:.2}s",
                    reports.len(),
                    started.elapsed().as_secs_f64()
                ))
                .field("servers", reports.len())
                .log();
        }

        Ok(reports)
    }

    async fn test_server<S: MeasurementServer>(&self, server: &S, interactive: bool) -> Result<Report> {
        let level = self.options.telemetry_level();
        server.diagnostic_log().set_level(level);

        let url = server
            .resolve_url()
            .in_phase(MeasurementPhase::ResolveUrl)
            .map_err(|e| self.hard_failure("Failed to get server URL", e))?;
        let host = url.host_str().unwrap_or_default().to_string();
        self.logger
            .info(&format!("Selected server: {} [{}]", server.name(), host))
            .log();

        let sponsor = server.sponsor();
        if !sponsor.is_empty() {
            self.logger.info(&format!("Sponsored by: {}", sponsor)).log();
        }

        if !server.is_up().await {
            self.logger
                .info(&format!(
                    "Selected server {} ({}) is not responding at the moment, try again later",
                    server.name(),
                    host
                ))
                .log();
        }

        let isp = server
            .isp_info(self.options.distance_unit)
            .await
            .in_phase(MeasurementPhase::IspLookup)
            .map_err(|e| self.hard_failure("Failed to get IP info", e))?;
        self.logger
            .info(&format!("You're testing from: {}", isp.processed_string))
            .log();

        let latency = server
            .ping_and_jitter(crate::defaults::PING_COUNT, self.options.source_ip, self.options.network)
            .await
            .in_phase(MeasurementPhase::PingJitter)
            .map_err(|e| self.hard_failure("Failed to get ping and jitter", e))?;
        self.logger
            .debug("Latency sampled")
            .field("ping_ms", latency.ping_ms)
            .field("jitter_ms", latency.jitter_ms)
            .log();

        let silent = !interactive || self.output.format().is_machine_readable();
        let transfer = TransferOptions::from_options(self.options, silent);
        let mut measurements = Measurements {
            ping: latency.ping_ms,
            jitter: latency.jitter_ms,
            ..Default::default()
        };

        if self.options.no_download {
            self.logger.info("Download test is disabled").log();
        } else {
            let sample = server
                .download(&transfer)
                .await
                .in_phase(MeasurementPhase::Download)
                .map_err(|e| self.hard_failure("Failed to get download speed", e))?;
            measurements.download = sample.mbps;
            measurements.bytes_received = sample.bytes;
        }

        if self.options.no_upload {
            self.logger.info("Upload test is disabled").log();
        } else {
            let sample = server
                .upload(&transfer)
                .await
                .in_phase(MeasurementPhase::Upload)
                .map_err(|e| self.hard_failure("Failed to get upload speed", e))?;
            measurements.upload = sample.mbps;
            measurements.bytes_sent = sample.bytes;
        }

        let share = if level.is_enabled() {
            self.share_result(server, &isp, &measurements).await
        } else {
            String::new()
        };

        Ok(Report::new(server.name(), &url, &isp, &measurements, share))
    }

    /// Submit telemetry; any failure leaves the share link empty
    async fn share_result<S: MeasurementServer>(
        &self,
        server: &S,
        isp: &IspInfo,
        measurements: &Measurements,
    ) -> String {
        let Some(client) = &self.telemetry else {
            return String::new();
        };

        let submission = Submission {
            isp,
            metrics: TelemetryMetrics {
                download: round2(measurements.download),
                upload: round2(measurements.upload),
                ping: round2(measurements.ping),
                jitter: round2(measurements.jitter),
            },
            log: server.diagnostic_log().render(),
            extra: TelemetryExtra::new(server.name(), self.options.telemetry_extra.clone()),
        };

        match client
            .submit(&self.options.telemetry_server, &submission, self.logger)
            .await
        {
            Ok(link) => link.to_string(),
            Err(e) => {
                self.logger
                    .error(&format!("Error when sending telemetry data: {}", e))
                    .error_info(&e)
                    .log();
                String::new()
            }
        }
    }

    fn hard_failure(&self, what: &str, error: AppError) -> AppError {
        self.logger
            .error(&format!("{}: {}", what, error))
            .error_info(&error)
            .log();
        error
    }
}

/// Library entry point: no console output, reports are returned
pub async fn speed_test<S: MeasurementServer>(servers: &[S], options: &TestOptions) -> Result<Vec<Report>> {
    let logger = Logger::silent();
    speed_test_with_logger(servers, options, &logger).await
}

/// Library entry point with a caller supplied logger
pub async fn speed_test_with_logger<S: MeasurementServer>(
    servers: &[S],
    options: &TestOptions,
    logger: &Logger,
) -> Result<Vec<Report>> {
    SpeedTestExecutor::new(options, logger)
        .run(servers, RunMode::Library)
        .await
}

/// Command line entry point: results are rendered to `out`
pub async fn cli_speed_test<S: MeasurementServer>(
    servers: &[S],
    options: &TestOptions,
    logger: &Logger,
    out: &mut dyn Write,
) -> Result<()> {
    SpeedTestExecutor::new(options, logger)
        .run(servers, RunMode::Interactive(out))
        .await
        .map(|_| ())
}
