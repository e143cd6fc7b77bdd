use regex::RegexSet;

const DB_ERROR_SIGNATURES: &[&str] = &[
    r"SQL syntax",
    r"mysql_fetch",
    r"ORA-0\d{4}",
    r"SQLite(3)? ?(Error|Exception)",
    r"You have an error in your SQL",
    r"Warning: (mysql|pg)_",
    r"SQLSTATE\[",
    r"Unclosed quotation mark",
    r"Microsoft OLE DB Provider",
    r"ODBC SQL Server Driver",
    r"PostgreSQL.*ERROR",
    r"quoted string not properly terminated",
];

const XSS_INDICATORS: &[&str] = &[
    "<script", "<img", "<svg", "<iframe", "<body",
    "onerror=", "onload=", "onclick=", "onmouseover=",
    "javascript:", "alert(", "prompt(", "confirm(",
];

/// Response classifier used by the injection modules.
/// Only flags responses carrying concrete evidence.
pub struct ResponseDetector {
    db_errors: RegexSet,
}

impl ResponseDetector {
    pub fn new() -> Self {
        Self {
            db_errors: RegexSet::new(DB_ERROR_SIGNATURES)
                .unwrap_or_else(|_| RegexSet::empty()),
        }
    }

    /// Returns the first database error signature found in `body`.
    pub fn sql_error(&self, body: &str) -> Option<&'static str> {
        self.db_errors
            .matches(body)
            .into_iter()
            .next()
            .map(|i| DB_ERROR_SIGNATURES[i])
    }

    /// Verbatim reflection of an XSS payload in an HTML response.
    pub fn reflects_xss(&self, body: &str, payload: &str, content_type: Option<&str>) -> bool {
        if !is_xss_payload(payload) || !body.contains(payload) {
            return false;
        }
        content_type.map_or(false, |ct| ct.contains("text/html"))
    }
}

impl Default for ResponseDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_xss_payload(payload: &str) -> bool {
    let payload_lower = payload.to_lowercase();
    XSS_INDICATORS.iter().any(|i| payload_lower.contains(i))
}
