pub mod headers;
pub mod injection;
pub mod port_scanner;
pub mod sqli;
pub mod xss;

use std::str::FromStr;

use crate::core::module::ModuleOptions;
use crate::core::registry::{LoadLocation, NamespaceSource, UnitEntry};
use crate::core::result::ExecutionResult;
use crate::core::{AUXILIARY, EXPLOIT};

pub use headers::HeaderAnalyzer;
pub use port_scanner::PortScanner;
pub use sqli::SqlInjection;
pub use xss::ReflectedXss;

/// The bundled catalog: one source per namespace.
pub fn default_sources() -> Vec<NamespaceSource> {
    vec![
        NamespaceSource::new(EXPLOIT, exploit_units),
        NamespaceSource::new(AUXILIARY, auxiliary_units),
    ]
}

fn exploit_units() -> anyhow::Result<Vec<UnitEntry>> {
    Ok(vec![
        UnitEntry::new("sqli", LoadLocation::of("modules::sqli", SqlInjection::new)),
        UnitEntry::new("xss", LoadLocation::of("modules::xss", ReflectedXss::new)),
    ])
}

fn auxiliary_units() -> anyhow::Result<Vec<UnitEntry>> {
    Ok(vec![
        UnitEntry::new("headers", LoadLocation::of("modules::headers", HeaderAnalyzer::new)),
        UnitEntry::new(
            "port_scanner",
            LoadLocation::of("modules::port_scanner", PortScanner::new),
        ),
    ])
}

/// Parses a numeric option, turning a bad value into a failed result.
pub(crate) fn numeric_option<T: FromStr>(
    options: &ModuleOptions,
    name: &str,
) -> Result<T, ExecutionResult> {
    let raw = options.get(name).unwrap_or_default();
    raw.trim().parse().map_err(|_| {
        ExecutionResult::failure(format!("Invalid value for {}: '{}'", name.to_uppercase(), raw))
    })
}

/// Longest accepted `TIMEOUT`, in seconds.
pub(crate) const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Reads `TIMEOUT`, rejecting zero and values past [`MAX_TIMEOUT_SECONDS`].
pub(crate) fn timeout_option(options: &ModuleOptions) -> Result<u64, ExecutionResult> {
    let seconds: u64 = numeric_option(options, "TIMEOUT")?;
    if seconds == 0 || seconds > MAX_TIMEOUT_SECONDS {
        return Err(ExecutionResult::failure(format!(
            "TIMEOUT must be between 1 and {} seconds",
            MAX_TIMEOUT_SECONDS
        )));
    }
    Ok(seconds)
}
