use log::info;
use reqwest::header::HeaderMap;
use serde_json::json;

use crate::core::module::{Module, ModuleOptions};
use crate::core::result::{ExecutionResult, Finding};
use crate::core::AUXILIARY;
use crate::http::HttpClient;
use crate::modules::timeout_option;
use crate::utils::normalize_url;

pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("Strict-Transport-Security", "HSTS - Forces HTTPS connections"),
    ("Content-Security-Policy", "CSP - Prevents XSS and injection attacks"),
    ("X-Frame-Options", "Prevents clickjacking attacks"),
    ("X-Content-Type-Options", "Prevents MIME type sniffing"),
    ("X-XSS-Protection", "Legacy XSS protection (mostly deprecated)"),
    ("Referrer-Policy", "Controls referrer information"),
    ("Permissions-Policy", "Controls browser features"),
];

/// Reports which recommended security headers a site omits.
pub struct HeaderAnalyzer {
    options: ModuleOptions,
}

impl HeaderAnalyzer {
    pub fn new() -> Self {
        Self {
            options: ModuleOptions::new()
                .required("URL", "", "Page to fetch")
                .optional("TIMEOUT", "10", "Request timeout in seconds")
                .optional("PROXY", "", "Proxy URL (e.g. http://127.0.0.1:8080)"),
        }
    }
}

impl Default for HeaderAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits the recommended headers into (present, missing).
pub fn audit_headers(headers: &HeaderMap) -> (Vec<&'static str>, Vec<(&'static str, &'static str)>) {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    for (name, purpose) in SECURITY_HEADERS {
        if headers.contains_key(*name) {
            present.push(*name);
        } else {
            missing.push((*name, *purpose));
        }
    }
    (present, missing)
}

impl Module for HeaderAnalyzer {
    fn description(&self) -> &str {
        "HTTP security headers analyzer"
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
        let url = normalize_url(self.options.get("URL").unwrap_or_default());
        let seconds = match timeout_option(&self.options) {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };
        let client = HttpClient::new(seconds, self.options.get("PROXY"))?;

        info!("Analyzing headers for {}", url);
        let response = match client.get(&url) {
            Ok(r) => r,
            Err(e) => return Ok(ExecutionResult::failure(format!("Error: {}", e))),
        };

        let (present, missing) = audit_headers(response.headers());
        let all_headers: serde_json::Map<String, serde_json::Value> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or(""))))
            .collect();

        let mut result = ExecutionResult::success(format!(
            "Found {}/{} security headers",
            present.len(),
            SECURITY_HEADERS.len()
        ));
        for (name, purpose) in &missing {
            result = result.with_vulnerability(Finding::with_description(
                "Missing Security Header",
                format!("{}: {}", name, purpose),
            ));
        }

        let missing_names: Vec<&str> = missing.iter().map(|(name, _)| *name).collect();
        Ok(result.with_data(json!({
            "status": response.status().as_u16(),
            "present": present,
            "missing": missing_names,
            "all_headers": all_headers,
        })))
    }
}
