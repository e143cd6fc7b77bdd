use std::time::Duration;

use futures::{stream, StreamExt};
use log::{debug, info};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::core::module::{Module, ModuleOptions};
use crate::core::result::ExecutionResult;
use crate::core::AUXILIARY;
use crate::modules::{numeric_option, timeout_option};
use crate::utils::host_of;

pub const COMMON_PORTS: &[(u16, &str)] = &[
    (20, "FTP Data"),
    (21, "FTP Control"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8080, "HTTP Proxy"),
    (8443, "HTTPS Alt"),
    (27017, "MongoDB"),
];

/// TCP connect scanner over a port list or range.
pub struct PortScanner {
    options: ModuleOptions,
}

impl PortScanner {
    pub fn new() -> Self {
        Self {
            options: ModuleOptions::new()
                .required("TARGET", "", "Host, host:port or URL to scan")
                .optional("PORTS", "common", "'common', a range (1-1024) or a list (22,80,443)")
                .optional("TIMEOUT", "2", "Connect timeout in seconds")
                .optional("THREADS", "50", "Concurrent connection attempts"),
        }
    }
}

impl Default for PortScanner {
    fn default() -> Self {
        Self::new()
    }
}

pub fn service_name(port: u16) -> &'static str {
    COMMON_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

/// Parses `common`, `start-end`, or a comma-separated list.
pub fn parse_ports(spec: &str) -> Option<Vec<u16>> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("common") {
        return Some(COMMON_PORTS.iter().map(|(p, _)| *p).collect());
    }

    if let Some((start, end)) = spec.split_once('-') {
        let start: u16 = start.trim().parse().ok()?;
        let end: u16 = end.trim().parse().ok()?;
        if start == 0 || start > end {
            return None;
        }
        return Some((start..=end).collect());
    }

    let ports: Vec<u16> = spec
        .split(',')
        .map(|p| p.trim().parse::<u16>().ok().filter(|p| *p != 0))
        .collect::<Option<_>>()?;
    if ports.is_empty() { None } else { Some(ports) }
}

async fn scan_ports(host: &str, ports: Vec<u16>, connect_timeout: Duration, concurrency: usize) -> Vec<u16> {
    let mut open: Vec<u16> = stream::iter(ports)
        .map(|port| async move {
            match timeout(connect_timeout, TcpStream::connect((host, port))).await {
                Ok(Ok(_)) => Some(port),
                Ok(Err(e)) => {
                    debug!("{}:{} closed ({})", host, port, e);
                    None
                }
                Err(_) => None,
            }
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|port| async move { port })
        .collect()
        .await;
    open.sort_unstable();
    open
}

impl Module for PortScanner {
    fn description(&self) -> &str {
        "TCP port scanner for common ports"
    }

    fn module_type(&self) -> &str {
        AUXILIARY
    }

    fn options(&self) -> &ModuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ModuleOptions {
        &mut self.options
    }

    fn run(&mut self) -> anyhow::Result<ExecutionResult> {
        let target = self.options.get("TARGET").unwrap_or_default();
        let Some(host) = host_of(target) else {
            return Ok(ExecutionResult::failure(format!("Invalid target: {}", target)));
        };
        let Some(ports) = parse_ports(self.options.get("PORTS").unwrap_or_default()) else {
            return Ok(ExecutionResult::failure("Invalid port specification"));
        };
        let seconds = match timeout_option(&self.options) {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };
        let threads: usize = match numeric_option(&self.options, "THREADS") {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };

        info!("Scanning {} port(s) on {}", ports.len(), host);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let open = runtime.block_on(scan_ports(&host, ports, Duration::from_secs(seconds), threads));

        let listing: Vec<serde_json::Value> = open
            .iter()
            .map(|port| json!({ "port": port, "service": service_name(*port) }))
            .collect();

        let message = if open.is_empty() {
            "No open ports found".to_string()
        } else {
            let summary: Vec<String> = open
                .iter()
                .map(|port| format!("{}/{}", port, service_name(*port)))
                .collect();
            format!("Found {} open ports: {}", open.len(), summary.join(", "))
        };

        Ok(ExecutionResult::success(message)
            .with_data(json!({ "host": host, "open_ports": listing })))
    }
}
