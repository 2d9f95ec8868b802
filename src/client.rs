use std::future::Future;

use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::error::{ConfigError, EndpointError};
use crate::protocol::{ChatRequest, ChatResponse};

/// Path the widget posts to unless configured otherwise.
pub const DEFAULT_ENDPOINT_PATH: &str = "/chat";

/// Request/response service that turns a message into a reply.
///
/// Futures are not required to be `Send`: the widget lives on a single
/// event-loop thread.
pub trait ChatEndpoint {
    fn send(&self, request: ChatRequest) -> impl Future<Output = Result<ChatResponse, EndpointError>>;
}

/// `ChatEndpoint` over HTTP: one JSON `POST` per message.
#[derive(Debug, Clone)]
pub struct HttpEndpoint {
    url: Url,
    client: Client,
}

impl HttpEndpoint {
    /// Resolves `endpoint` against `base_url` (`http://127.0.0.1:8080`).
    /// A relative `endpoint` (`/chat`) lands under the base; an absolute one
    /// is used as is.
    pub fn new(base_url: &str, endpoint: &str) -> Result<Self, ConfigError> {
        let endpoint = endpoint.trim();
        let invalid = |source| ConfigError::Endpoint {
            endpoint: endpoint.to_string(),
            source,
        };
        let url = Url::parse(base_url)
            .and_then(|base| base.join(endpoint))
            .map_err(invalid)?;
        info!("Chat endpoint at: {}", url);

        Ok(Self {
            url,
            client: Client::new(),
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl ChatEndpoint for HttpEndpoint {
    async fn send(&self, request: ChatRequest) -> Result<ChatResponse, EndpointError> {
        debug!("Posting {} bytes to {}", request.message.len(), self.url);

        // `json` sets `Content-Type: application/json`
        let response = self
            .client
            .post(self.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(EndpointError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EndpointError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(EndpointError::Decode)
    }
}
