use crate::core::module::{Module, ModuleOptions};
use crate::core::result::ExecutionResult;
use crate::core::EXPLOIT;
use crate::modules::injection::InjectionTarget;
use crate::utils::detector::ResponseDetector;
use crate::utils::payload_loader::POLYGLOT_XSS;

/// Reflected XSS probe. A hit needs the payload echoed verbatim in an HTML
/// response.
pub struct ReflectedXss {
    options: ModuleOptions,
    detector: ResponseDetector,
}

impl ReflectedXss {
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

impl Default for ReflectedXss {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ReflectedXss {
    fn description(&self) -> &str {
        "Reflected cross-site scripting scanner"
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
        let target = match InjectionTarget::from_options(&self.options, POLYGLOT_XSS) {
            Ok(t) => t,
            Err(failure) => return Ok(failure),
        };

        let detector = &self.detector;
        let findings = target.probe("Reflected XSS", |probe| {
            detector
                .reflects_xss(probe.body, probe.payload, probe.content_type)
                .then(|| format!("Parameter '{}' reflects payload {}", probe.param, probe.payload))
        });

        Ok(target.summarize("reflected XSS", findings))
    }
}
