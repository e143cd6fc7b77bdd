pub mod core;
pub mod http;
pub mod modules;
pub mod utils;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub use crate::core::console::{Command, Console, ConsoleState};
pub use crate::core::module::{Module, ModuleInfo, ModuleOptions, OptionError, OptionRow};
pub use crate::core::registry::{
    LoadLocation, ModuleDescriptor, ModuleRegistry, NamespaceSource, RegistryError, UnitEntry,
};
pub use crate::core::result::{execute_isolated, ExecutionOutcome, ExecutionResult, Finding};
pub use crate::http::HttpClient;
pub use crate::utils::read_lines;

/// Console settings read from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleConfig {
    pub prompt: String,
    pub show_banner: bool,
    pub history_file: Option<String>,
    /// Option presets applied to every module that declares them on `use`.
    pub option_defaults: BTreeMap<String, String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "kestrel".to_string(),
            show_banner: true,
            history_file: None,
            option_defaults: BTreeMap::new(),
        }
    }
}

impl ConsoleConfig {
    pub const DEFAULT_PATH: &'static str = "kestrel.json";

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path))?;
        serde_json::from_str(&data).with_context(|| format!("invalid config '{}'", path))
    }
}

/// Output abstraction for the console.
/// The binary renders to the terminal; tests record events.
pub trait ConsoleEventSink: Send + Sync {
    fn on_log(&self, level: &str, message: &str);
    fn on_listing(&self, title: &str, entries: &[String]);
    fn on_module_info(&self, info: &ModuleInfo);
    fn on_options(&self, rows: &[OptionRow]);
    fn on_result(&self, result: &ExecutionResult);
    fn on_help(&self, commands: &[(&'static str, &'static str)]);
    fn on_banner(&self);
    fn on_clear(&self);
}

pub type SinkRef = Arc<dyn ConsoleEventSink>;

pub fn banner() -> &'static str {
    r#"
  _  __         _            _
 | |/ /___  ___| |_ _ __ ___| |
 | ' // _ \/ __| __| '__/ _ \ |
 | . \  __/\__ \ |_| | |  __/ |
 |_|\_\___||___/\__|_|  \___|_|

   modular security-assessment console
    "#
}

/// Colored terminal output.
pub struct TerminalSink;

impl TerminalSink {
    pub fn new_ref() -> SinkRef {
        Arc::new(Self)
    }
}

fn rule() -> String {
    use colored::*;
    "=".repeat(60).white().to_string()
}

impl ConsoleEventSink for TerminalSink {
    fn on_log(&self, level: &str, message: &str) {
        use colored::*;
        let colored = match level {
            "success" => format!("[+] {}", message).green().to_string(),
            "error"   => format!("[!] {}", message).red().to_string(),
            "warn"    => format!("[*] {}", message).yellow().to_string(),
            _         => message.to_string(),
        };
        println!("{}", colored);
    }

    fn on_listing(&self, title: &str, entries: &[String]) {
        use colored::*;
        println!("\n{}", title.yellow());
        println!("{}", rule());
        for entry in entries {
            println!("  {}", entry.green());
        }
        println!();
    }

    fn on_module_info(&self, info: &ModuleInfo) {
        use colored::*;
        println!("\n{}", "Module Information".yellow());
        println!("{}", rule());
        println!("  Name:        {}", info.name.cyan());
        println!("  Type:        {}", info.module_type.cyan());
        println!("  Description: {}", info.description.cyan());
        println!("  Author:      {}", info.author.cyan());
        println!();
    }

    fn on_options(&self, rows: &[OptionRow]) {
        use colored::*;
        println!("\n{}", "Module Options".yellow());
        println!("{}", rule());
        println!(
            "  {}",
            format!("{:<15} {:<25} {:<8} {}", "Name", "Value", "Required", "Description").cyan()
        );
        println!("  {} {} {} {}", "-".repeat(15), "-".repeat(25), "-".repeat(8), "-".repeat(11));
        for row in rows {
            println!(
                "  {:<15} {:<25} {:<8} {}",
                row.name, row.value, row.required, row.description
            );
        }
        println!();
    }

    fn on_result(&self, result: &ExecutionResult) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = render_result(&mut out, result) {
            log::debug!("Failed to render result: {}", e);
        }
    }

    fn on_help(&self, commands: &[(&'static str, &'static str)]) {
        use colored::*;
        println!("\n{}", "Core Commands".yellow());
        println!("{}", rule());
        for (usage, summary) in commands {
            println!("  {:<18} {}", usage, summary);
        }
        println!();
    }

    fn on_banner(&self) {
        use colored::*;
        println!("{}", banner().bright_red().bold());
        println!("{}", "──────────────────────────────────────────────────".dimmed());
    }

    fn on_clear(&self) {
        print!("\x1b[2J\x1b[1;1H");
        std::io::stdout().flush().ok();
    }
}

/// Writes a module result: status line, message, then vulnerabilities and
/// exploits. Empty messages, empty lists and missing descriptions are skipped.
pub fn render_result(out: &mut impl Write, result: &ExecutionResult) -> io::Result<()> {
    use colored::*;
    if result.success {
        writeln!(out, "\n{}", "[+] Module execution completed".green())?;
    } else {
        writeln!(out, "\n{}", "[!] Module execution failed".red())?;
    }

    if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
        writeln!(out, "{}", message.cyan())?;
    }

    for (title, findings) in [
        ("Vulnerabilities Found:", &result.vulnerabilities),
        ("Exploits Found:", &result.exploits),
    ] {
        if findings.is_empty() {
            continue;
        }
        writeln!(out, "\n{}", title.yellow())?;
        for finding in findings {
            writeln!(out, "  {}", format!("- {}", finding.kind).red())?;
            if let Some(ref description) = finding.description {
                writeln!(out, "    {}", description.white())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_missing_file_uses_defaults() {
        let config = ConsoleConfig::load("/nonexistent/kestrel.json").unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.prompt, "kestrel");
        assert!(config.show_banner);
    }

    #[test]
    fn test_config_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"prompt":"lab","optionDefaults":{{"TIMEOUT":"3"}}}}"#).unwrap();

        let config = ConsoleConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.prompt, "lab");
        assert!(config.show_banner);
        assert_eq!(config.option_defaults.get("TIMEOUT").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_config_malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = ConsoleConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config"));
    }

    fn render_plain(result: &ExecutionResult) -> Vec<String> {
        colored::control::set_override(false);
        let mut out = Vec::new();
        render_result(&mut out, result).unwrap();
        String::from_utf8(out).unwrap().lines().map(str::to_string).collect()
    }

    #[test]
    fn test_render_result_orders_sections() {
        let result = ExecutionResult::success("2 issues")
            .with_vulnerability(Finding::with_description("SQL Injection", "Parameter 'id'"))
            .with_vulnerability(Finding::new("Weak Cipher"))
            .with_exploit(Finding::with_description("Auth Bypass", "admin:admin accepted"));

        assert_eq!(
            render_plain(&result),
            vec![
                "",
                "[+] Module execution completed",
                "2 issues",
                "",
                "Vulnerabilities Found:",
                "  - SQL Injection",
                "    Parameter 'id'",
                "  - Weak Cipher",
                "",
                "Exploits Found:",
                "  - Auth Bypass",
                "    admin:admin accepted",
            ]
        );
    }

    #[test]
    fn test_render_result_skips_empty_message_and_lists() {
        let result = ExecutionResult::failure("")
            .with_exploit(Finding::new("Default Credentials"));

        assert_eq!(
            render_plain(&result),
            vec!["", "[!] Module execution failed", "", "Exploits Found:", "  - Default Credentials"]
        );
    }
}
