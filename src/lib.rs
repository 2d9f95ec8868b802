//! A chat widget that posts each submitted message to a `/chat` endpoint and
//! renders the reply, plus the small server that hosts it.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod widget;

#[cfg(not(target_arch = "wasm32"))]
pub mod bot;
#[cfg(not(target_arch = "wasm32"))]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use client::{ChatEndpoint, HttpEndpoint};
pub use error::{ConfigError, EndpointError};
pub use protocol::{ChatMessage, ChatRequest, ChatResponse, Sender};
pub use widget::ChatWidget;
