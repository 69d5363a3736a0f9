//! Blocking `Transport` backed by a shared `ureq::Agent`.
//!
//! The agent owns a thread-safe connection pool, so one `UreqTransport` can
//! serve concurrent calls. ureq never blocks on pool checkout; the
//! `connection_request` timeout bounds sending the request instead.
//! `socket` bounds only the wait for the response head, so a slow but
//! steady body is read to the end unless `Timeouts::body` caps it.

use ureq::Agent;

use crate::config::Timeouts;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeouts: &Timeouts) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(timeouts.connect))
            .timeout_send_request(Some(timeouts.connection_request))
            .timeout_recv_response(Some(timeouts.socket))
            .timeout_recv_body(timeouts.body)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent configured elsewhere. It must have
    /// `http_status_as_error(false)`.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&Timeouts::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.send(request.body.as_deref().unwrap_or_default())
            }
        };
        let mut response = result.map_err(|e| TransportError::request(url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| TransportError::request(url, e))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
