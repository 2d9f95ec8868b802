use thiserror::Error;

/// Why a `/chat` round trip produced no reply.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("chat request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("chat endpoint answered with status {status}")]
    Status { status: u16 },

    #[error("chat reply was not a valid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown reply order `{0}` (expected arrival, submission or latest)")]
    ReplyOrder(String),

    #[error("unknown reply format `{0}` (expected text or markup)")]
    ReplyFormat(String),

    #[error("cannot resolve chat endpoint `{endpoint}`: {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid port `{0}`")]
    Port(String),
}
