use log::{debug, info};
use serde_json::json;
use url::Url;

use crate::core::module::ModuleOptions;
use crate::core::result::{ExecutionResult, Finding};
use crate::http::HttpClient;
use crate::modules::timeout_option;
use crate::utils::normalize_url;
use crate::utils::payload_loader::PayloadLoader;

/// One HTTP response as seen by an injection check.
pub struct Probe<'a> {
    pub param: &'a str,
    pub payload: &'a str,
    pub url: &'a Url,
    pub body: &'a str,
    pub content_type: Option<&'a str>,
}

/// Query parameters to test. `only` restricts the list to one name, which is
/// tested even when the URL does not carry it yet.
pub fn injection_points(url: &Url, only: &str) -> Vec<String> {
    let only = only.trim();
    if !only.is_empty() {
        return vec![only.to_string()];
    }

    let mut params: Vec<String> = Vec::new();
    for (key, _) in url.query_pairs() {
        if !params.iter().any(|p| *p == key) {
            params.push(key.to_string());
        }
    }
    params
}

/// Replaces (or appends) `param` in the query string with `payload`.
pub fn mutate_query(url: &Url, param: &str, payload: &str) -> Url {
    let mut url = url.clone();
    let mut found = false;

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == param {
                found = true;
                (k.to_string(), payload.to_string())
            } else {
                (k.to_string(), v.to_string())
            }
        })
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &pairs {
            query.append_pair(k, v);
        }
        if !found {
            query.append_pair(param, payload);
        }
    }
    url
}

/// Sends every payload into every parameter and reports the first hit per
/// parameter. `check` returns a description when the response is evidence.
pub fn probe_parameters<F>(
    client: &HttpClient,
    url: &Url,
    params: &[String],
    payloads: &PayloadLoader,
    kind: &str,
    check: F,
) -> Vec<Finding>
where
    F: Fn(&Probe<'_>) -> Option<String>,
{
    let mut findings = Vec::new();

    for param in params {
        for payload in payloads.payloads() {
            let mutated = mutate_query(url, param, payload);
            let response = match client.get(mutated.as_str()) {
                Ok(r) => r,
                Err(e) => {
                    debug!("Request to {} failed: {}", mutated, e);
                    continue;
                }
            };

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = match response.text() {
                Ok(body) => body,
                Err(e) => {
                    debug!("Failed to read body from {}: {}", mutated, e);
                    continue;
                }
            };

            let probe = Probe {
                param,
                payload,
                url: &mutated,
                body: &body,
                content_type: content_type.as_deref(),
            };
            if let Some(description) = check(&probe) {
                findings.push(Finding::with_description(kind, description));
                break;
            }
        }
    }

    findings
}

/// Target, parameters, client and payloads shared by the injection modules.
pub struct InjectionTarget {
    pub url: Url,
    pub params: Vec<String>,
    pub client: HttpClient,
    pub payloads: PayloadLoader,
}

impl InjectionTarget {
    /// Reads `URL`, `PARAM`, `PAYLOADS`, `TIMEOUT` and `PROXY`. Unusable
    /// values come back as a failed result.
    pub fn from_options(options: &ModuleOptions, builtin: &[&str]) -> Result<Self, ExecutionResult> {
        let raw = options.get("URL").unwrap_or_default();
        let url = Url::parse(&normalize_url(raw))
            .map_err(|e| ExecutionResult::failure(format!("Invalid URL {}: {}", raw, e)))?;

        let params = injection_points(&url, options.get("PARAM").unwrap_or_default());
        if params.is_empty() {
            return Err(ExecutionResult::failure(
                "No parameters to test (set PARAM or use a URL with a query string)",
            ));
        }

        let seconds = timeout_option(options)?;
        let client = HttpClient::new(seconds, options.get("PROXY"))
            .map_err(|e| ExecutionResult::failure(format!("Error: {:#}", e)))?;
        let payloads = PayloadLoader::with_builtin(builtin)
            .extend_from_file(options.get("PAYLOADS").unwrap_or_default());

        info!(
            "Testing {} parameter(s) with {} payloads on {}",
            params.len(),
            payloads.payload_count(),
            url
        );
        Ok(Self { url, params, client, payloads })
    }

    pub fn probe<F>(&self, kind: &str, check: F) -> Vec<Finding>
    where
        F: Fn(&Probe<'_>) -> Option<String>,
    {
        probe_parameters(&self.client, &self.url, &self.params, &self.payloads, kind, check)
    }

    /// Successful result carrying `findings`; `label` names the weakness in
    /// the summary line.
    pub fn summarize(&self, label: &str, findings: Vec<Finding>) -> ExecutionResult {
        let message = if findings.is_empty() {
            format!(
                "No {} detected ({} parameter(s), {} payloads)",
                label,
                self.params.len(),
                self.payloads.payload_count()
            )
        } else {
            format!("Found {} potential {} point(s)", findings.len(), label)
        };

        let mut result = ExecutionResult::success(message).with_data(json!({
            "url": self.url.as_str(),
            "parameters": self.params,
            "payloads": self.payloads.payload_count(),
        }));
        for finding in findings {
            result = result.with_vulnerability(finding);
        }
        result
    }
}
