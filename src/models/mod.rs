//! Data models and structures for the speed test client

pub mod config;
pub mod isp;
pub mod report;
pub mod server;
pub mod telemetry;

// Re-export main model types
pub use config::{OutputOptions, TestOptions};
pub use isp::{IpInfoResponse, IspInfo};
pub use report::{round2, ClientInfo, FlatReport, Measurements, Report, ServerInfo};
pub use server::ServerDefinition;
pub use telemetry::{parse_extra, TelemetryExtra, TelemetryServer};
