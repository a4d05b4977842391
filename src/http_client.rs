//! # Shared HTTP client
//!
//! [`HttpClient`] wraps a single [`ureq::Agent`] reused by every network collaborator
//! of the crate (name resolution, catalog queries), so that connections are pooled and
//! a single timeout policy applies to all of them.
//!
//! ```text
//! HttpClient
//! └── agent (ureq::Agent, global timeout)
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::resolver::SesameResolver`] – Name resolution over HTTP.
//! * [`crate::catalog::ExoplanetArchive`] – TAP catalog queries over HTTP.
use std::time::Duration;

use ureq::Agent;

use crate::constants::DEFAULT_TIMEOUT_SECS;

/// Blocking HTTP client with a global per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: Agent,
    timeout: Duration,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl HttpClient {
    /// Create a client whose requests fail once `timeout` has elapsed.
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        let agent: Agent = config.into();

        HttpClient { agent, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body as text.
    ///
    /// HTTP error statuses (4xx, 5xx) are reported as errors, like transport failures
    /// and timeouts.
    pub fn get_text(&self, url: &str) -> Result<String, ureq::Error> {
        log::debug!("GET {url}");
        self.agent.get(url).call()?.body_mut().read_to_string()
    }
}

#[cfg(test)]
mod http_client_test {
    use super::*;

    #[test]
    fn test_connection_refused_is_an_error() {
        let client = HttpClient::new(Duration::from_secs(1));
        assert_eq!(client.timeout(), Duration::from_secs(1));
        assert!(client.get_text("http://127.0.0.1:9/").is_err());
    }
}
