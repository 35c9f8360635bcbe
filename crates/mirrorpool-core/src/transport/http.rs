//! libcurl-backed transport: one GET per attempt, body buffered in memory.

use std::time::Duration;

use super::{Transport, TransportError};

const MAX_REDIRECTIONS: u32 = 10;

/// Blocking HTTP transport. A fresh easy handle is used per attempt so that
/// concurrent fetches never share connection state.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    user_agent: Option<String>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.connect_timeout(timeout)?;
        easy.timeout(timeout)?;
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            tracing::debug!(url = %url, code, "fetch returned non-success status");
            return Err(TransportError::Http(code));
        }
        Ok(body)
    }
}
