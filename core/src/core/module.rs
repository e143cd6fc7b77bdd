use serde::Serialize;
use thiserror::Error;

use crate::core::result::ExecutionResult;

pub const DEFAULT_AUTHOR: &str = "Kestrel Team";

/// Validation failure for a module's option set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    #[error("Required option '{0}' is not set")]
    MissingRequired(String),
}

/// Metadata shown by the `info` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
    pub author: String,
    #[serde(rename = "type")]
    pub module_type: String,
}

/// One line of the `options` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRow {
    pub name: String,
    pub value: String,
    pub required: &'static str,
    pub description: String,
}

#[derive(Debug, Clone)]
struct OptionSlot {
    name: String,
    value: String,
    description: String,
}

/// Ordered, fixed set of string-valued options declared by a module.
///
/// Names are canonicalized to uppercase on declaration and on every lookup,
/// so `set target x` and `set TARGET x` address the same slot. The set of
/// names never changes after construction.
#[derive(Debug, Clone, Default)]
pub struct ModuleOptions {
    slots: Vec<OptionSlot>,
    required: Vec<String>,
}

impl ModuleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an option that must hold a non-empty value before `run`.
    pub fn required(mut self, name: &str, default: &str, description: &str) -> Self {
        let canonical = canonical_name(name);
        self.required.push(canonical.clone());
        self.declare(canonical, default, description);
        self
    }

    /// Declares an option that may stay empty.
    pub fn optional(mut self, name: &str, default: &str, description: &str) -> Self {
        self.declare(canonical_name(name), default, description);
        self
    }

    fn declare(&mut self, name: String, default: &str, description: &str) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.name == name) {
            slot.value = default.to_string();
            slot.description = description.to_string();
            return;
        }
        self.slots.push(OptionSlot {
            name,
            value: default.to_string(),
            description: description.to_string(),
        });
    }

    /// Stores `value` if `name` is declared. Returns false and leaves the set
    /// untouched otherwise.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let canonical = canonical_name(name);
        match self.slots.iter_mut().find(|s| s.name == canonical) {
            Some(slot) => {
                slot.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let canonical = canonical_name(name);
        self.slots
            .iter()
            .find(|s| s.name == canonical)
            .map(|s| s.value.as_str())
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_required(&self, name: &str) -> bool {
        let canonical = canonical_name(name);
        self.required.iter().any(|r| *r == canonical)
    }

    /// Fails on the first required option, in declaration order, whose value
    /// is empty.
    pub fn validate(&self) -> Result<(), OptionError> {
        for name in &self.required {
            if self.get(name).map_or(true, str::is_empty) {
                return Err(OptionError::MissingRequired(name.clone()));
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> Vec<OptionRow> {
        self.slots
            .iter()
            .map(|slot| OptionRow {
                name: slot.name.clone(),
                value: slot.value.clone(),
                required: if self.is_required(&slot.name) { "yes" } else { "no" },
                description: slot.description.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

pub fn canonical_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Capability contract every scanner or exploit exposes to the console.
///
/// Implementors provide their metadata, their option set, and `run`. Option
/// handling, validation and info rendering come from the provided methods so
/// the console never special-cases a module.
pub trait Module: Send {
    fn description(&self) -> &str;

    /// Namespace the module is registered under, e.g. `auxiliary`.
    fn module_type(&self) -> &str;

    fn options(&self) -> &ModuleOptions;

    fn options_mut(&mut self) -> &mut ModuleOptions;

    /// Executes the module. May block on network I/O for as long as it needs.
    fn run(&mut self) -> anyhow::Result<ExecutionResult>;

    /// Defaults to the implementing type's name.
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    fn author(&self) -> &str {
        DEFAULT_AUTHOR
    }

    fn info(&self) -> ModuleInfo {
        ModuleInfo {
            name: self.name(),
            description: self.description().to_string(),
            author: self.author().to_string(),
            module_type: self.module_type().to_string(),
        }
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        self.options_mut().set(name, value)
    }

    fn get_option(&self, name: &str) -> Option<&str> {
        self.options().get(name)
    }

    fn validate_options(&self) -> Result<(), OptionError> {
        self.options().validate()
    }

    fn show_options(&self) -> Vec<OptionRow> {
        self.options().rows()
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
