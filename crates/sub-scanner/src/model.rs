use serde::Serialize;
use std::net::IpAddr;
use time::OffsetDateTime;

// region:        --- Models

#[derive(Debug, Clone, Serialize)]
pub struct SubdomainResult {
    pub subdomain: String,
    pub ip: Option<IpAddr>,
    pub found: bool,
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

impl SubdomainResult {
    pub fn new(subdomain: impl Into<String>, ip: Option<IpAddr>) -> Self {
        Self {
            subdomain: subdomain.into(),
            ip,
            found: ip.is_some(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn ip_string(&self) -> String {
        self.ip.map(|ip| ip.to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResult {
    pub subdomain: String,
    pub port: u16,
    pub service: String,
    pub info: String,
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

impl ServiceResult {
    pub fn new(subdomain: &str, port: u16, service: &str, info: String) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            port,
            service: service.to_string(),
            info,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub subdomain: String,
    pub file_path: String,
    pub success: bool,
    pub size: u64,
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

impl FileResult {
    pub fn new(subdomain: &str, file_path: &str, success: bool, size: u64) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            file_path: file_path.to_string(),
            success,
            size,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

// endregion:     --- Models
