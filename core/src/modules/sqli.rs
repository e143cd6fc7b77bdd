use log::warn;

use crate::core::module::{Module, ModuleOptions};
use crate::core::result::ExecutionResult;
use crate::core::EXPLOIT;
use crate::modules::injection::InjectionTarget;
use crate::utils::detector::ResponseDetector;
use crate::utils::payload_loader::POLYGLOT_SQLI;

/// Error-based SQL injection probe over query parameters.
pub struct SqlInjection {
    options: ModuleOptions,
    detector: ResponseDetector,
}

impl SqlInjection {
    pub fn new() -> Self {
        Self {
            options: ModuleOptions::new()
                .required("URL", "", "Target URL with query parameters")
                .optional("PARAM", "", "Only test this parameter")
                .optional("PAYLOADS", "", "Extra payload wordlist file")
                .optional("TIMEOUT", "10", "Request timeout in seconds")
                .optional("PROXY", "", "Proxy URL (e.g. http://127.0.0.1:8080)"),
            detector: ResponseDetector::new(),
        }
    }
}

impl Default for SqlInjection {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for SqlInjection {
    fn description(&self) -> &str {
        "Error-based SQL injection scanner"
    }

    fn module_type(&self) -> &str {
        EXPLOIT
    }

    fn options(&self) -> &ModuleOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut ModuleOptions {
        &mut self.options
    }

    fn run(&mut self) -> anyhow::Result<ExecutionResult> {
        let target = match InjectionTarget::from_options(&self.options, POLYGLOT_SQLI) {
            Ok(t) => t,
            Err(failure) => return Ok(failure),
        };

        let baseline = match target.client.get(target.url.as_str()).and_then(|r| r.text()) {
            Ok(body) => body,
            Err(e) => return Ok(ExecutionResult::failure(format!("Error: {}", e))),
        };
        let baseline_error = self.detector.sql_error(&baseline);
        if let Some(signature) = baseline_error {
            warn!("Baseline response already matches '{}', ignoring that signature", signature);
        }

        let detector = &self.detector;
        let findings = target.probe("SQL Injection", |probe| {
            let signature = detector
                .sql_error(probe.body)
                .filter(|sig| Some(*sig) != baseline_error)?;
            Some(format!(
                "Parameter '{}' with payload {} (matched: {})",
                probe.param, probe.payload, signature
            ))
        });

        Ok(target.summarize("SQL injection", findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_server;

    fn vulnerable_server() -> String {
        test_server::serve(|request| {
            let body = if request.contains("id=%27") {
                "You have an error in your SQL syntax; check the manual".to_string()
            } else {
                "<html>item 1</html>".to_string()
            };
            ("text/html", Vec::new(), body)
        })
    }

    #[test]
    fn test_detects_error_based_injection() {
        let base = vulnerable_server();
        let mut module = SqlInjection::new();
        module.set_option("URL", &format!("{}/item?id=1&sort=asc", base));
        module.set_option("TIMEOUT", "5");

        let result = module.run().unwrap();
        assert!(result.success);
        assert_eq!(result.vulnerabilities.len(), 1);
        assert_eq!(result.vulnerabilities[0].kind, "SQL Injection");
        assert!(result.vulnerabilities[0]
            .description
            .as_deref()
            .unwrap()
            .starts_with("Parameter 'id'"));
    }

    #[test]
    fn test_clean_target_reports_nothing() {
        let base = test_server::serve(|_| ("text/html", Vec::new(), "<html>ok</html>".to_string()));
        let mut module = SqlInjection::new();
        module.set_option("URL", &format!("{}/item?id=1", base));
        module.set_option("TIMEOUT", "5");

        let result = module.run().unwrap();
        assert!(result.success);
        assert!(result.vulnerabilities.is_empty());
        assert!(result.message.unwrap().starts_with("No SQL injection detected"));
    }

    #[test]
    fn test_baseline_error_is_not_a_finding() {
        let base = test_server::serve(|_| {
            ("text/html", Vec::new(), "You have an error in your SQL syntax".to_string())
        });
        let mut module = SqlInjection::new();
        module.set_option("URL", &format!("{}/item?id=1", base));
        module.set_option("TIMEOUT", "5");

        let result = module.run().unwrap();
        assert!(result.vulnerabilities.is_empty());
    }

    #[test]
    fn test_url_without_parameters_fails() {
        let mut module = SqlInjection::new();
        module.set_option("URL", "http://127.0.0.1/");
        let result = module.run().unwrap();
        assert!(!result.success);
        assert!(result.message.unwrap().starts_with("No parameters to test"));
    }
}
