//! ISP and location information returned by the backend's `getIP` endpoint

use serde::{Deserialize, Deserializer, Serialize};

/// Raw ISP/location record as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpInfoResponse {
    pub ip: String,
    pub hostname: String,
    pub city: String,
    pub region: String,
    pub country: String,
    #[serde(rename = "loc")]
    pub location: String,
    #[serde(rename = "org")]
    pub organization: String,
    pub postal: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub readme: String,
}

/// Result of an ISP lookup: a display string plus the raw record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IspInfo {
    #[serde(rename = "processedString", default)]
    pub processed_string: String,
    #[serde(rename = "rawIspInfo", default, deserialize_with = "lenient_ip_info")]
    pub raw_isp_info: IpInfoResponse,
}

impl IspInfo {
    /// Build an ISP result from a bare IP, as some backends answer with plain text
    pub fn from_plain(ip: &str) -> Self {
        Self {
            processed_string: ip.to_string(),
            raw_isp_info: IpInfoResponse {
                ip: ip.to_string(),
                ..Default::default()
            },
        }
    }
}

// Backends without an ISP database send `"rawIspInfo": ""`.
fn lenient_ip_info<'de, D>(deserializer: D) -> std::result::Result<IpInfoResponse, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Object(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(IpInfoResponse::default()),
    }
}
