use crate::config::Config;
use crate::errors::*;
use std::io::Read;
use tracing::debug;

/// Anything that can hand back the raw registry text for a URL.
pub trait RegistrySource {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP fetch, one attempt per call.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .timeout_connect(config.connect_timeout)
            .build();
        HttpFetcher { agent }
    }
}

impl RegistrySource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "Downloading MAC vendor list");

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                bail!(ErrorKind::UpstreamError(code, response.status_text().to_string()))
            }
            Err(ureq::Error::Transport(transport)) => {
                bail!(ErrorKind::TransportError(transport.to_string()))
            }
        };

        let mut body = Vec::new();
        response.into_reader()
            .read_to_end(&mut body)
            .map_err(|e| ErrorKind::TransportError(format!("failed to read response: {}", e)))?;

        debug!(bytes = body.len(), "Downloaded MAC vendor list");

        String::from_utf8(body)
            .map_err(|_| ErrorKind::TransportError("response is not valid UTF-8".to_string()).into())
    }
}
