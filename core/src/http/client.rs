use rand::prelude::IndexedRandom;
use reqwest::blocking::{Client, ClientBuilder, Response};
use reqwest::Proxy;
use std::time::Duration;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) \
     Gecko/20100101 Firefox/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_0) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
];

/// Blocking HTTP client shared by the web modules.
///
/// Certificates are not verified and every request carries a randomly
/// chosen browser User-Agent.
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout_seconds: u64, proxy_url: Option<&str>) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(timeout_seconds);

        let mut builder = ClientBuilder::new()
            .timeout(timeout)
            .danger_accept_invalid_certs(true);

        if let Some(proxy) = proxy_url.filter(|p| !p.is_empty()) {
            builder = builder.proxy(Proxy::all(proxy)?);
        } else {
            builder = builder.no_proxy();
        }

        Ok(Self {
            inner: builder.build()?,
            timeout,
        })
    }

    pub fn get(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.inner
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .timeout(self.timeout)
            .send()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    *USER_AGENTS.choose(&mut rng).unwrap_or(&"Mozilla/5.0")
}
