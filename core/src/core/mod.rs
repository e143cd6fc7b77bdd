pub mod console;
pub mod module;
pub mod registry;
pub mod result;

/// Namespace for modules that attempt to confirm or exploit a weakness.
pub const EXPLOIT: &str = "exploit";

/// Namespace for scanners, fingerprinting and information gathering.
pub const AUXILIARY: &str = "auxiliary";
