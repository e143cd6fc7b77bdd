pub mod detector;
pub mod payload_loader;

use std::fs::File;
use std::io;
use std::io::BufRead;
use std::path::Path;

use url::Url;

/// Reads a file line-by-line, returning all non-empty trimmed lines.
pub fn read_lines(path: &str) -> io::Result<Vec<String>> {
    let file = File::open(Path::new(path))?;
    let reader = io::BufReader::new(file);
    let lines = reader
        .lines()
        .filter_map(|line| {
            let line = line.ok()?;
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() { None } else { Some(trimmed) }
        })
        .collect();
    Ok(lines)
}

/// Prefixes `http://` when the target carries no scheme.
pub fn normalize_url(target: &str) -> String {
    let target = target.trim();
    if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

/// Extracts the host from a bare hostname, `host:port`, or a full URL.
pub fn host_of(target: &str) -> Option<String> {
    let url = Url::parse(&normalize_url(target)).ok()?;
    url.host_str().map(|h| h.trim_matches(|c| c == '[' || c == ']').to_string())
}
