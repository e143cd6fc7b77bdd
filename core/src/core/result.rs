use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::module::Module;

/// A single vulnerability or exploit entry reported by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Finding {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), description: None }
    }

    pub fn with_description(kind: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            description: Some(description.into()),
        }
    }
}

/// Structured outcome of a module run. Empty collections mean nothing to
/// render for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vulnerabilities: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exploits: Vec<Finding>,
    /// Module-specific payload for report writers. Never rendered.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl ExecutionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_vulnerability(mut self, finding: Finding) -> Self {
        self.vulnerabilities.push(finding);
        self
    }

    pub fn with_exploit(mut self, finding: Finding) -> Self {
        self.exploits.push(finding);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

/// What the console gets back from a module run: either the module's own
/// result or the fault that escaped it.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Completed(ExecutionResult),
    Fault(String),
}

/// Runs the module with both error returns and panics contained.
pub fn execute_isolated(module: &mut dyn Module) -> ExecutionOutcome {
    match catch_fault(|| module.run()) {
        Ok(result) => ExecutionOutcome::Completed(result),
        Err(message) => ExecutionOutcome::Fault(message),
    }
}

/// Serializes panic hook swaps between concurrent isolated calls.
static HOOK_LOCK: Mutex<()> = Mutex::new(());

/// Calls `f`, flattening `Err` and panics into a printable message.
///
/// While `f` runs, panics are routed to `log` instead of the default hook so
/// the operator only sees the console's own error line.
pub(crate) fn catch_fault<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    let _guard = HOOK_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| debug!("Isolated panic: {}", info)));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "module panicked".to_string()
    }
}
