//! The server-side bot behind `POST /chat`.

pub mod classifier;
pub mod search;

use anyhow::Result;
use log::info;

use crate::config::ServerConfig;
use classifier::IntentClassifier;
use search::{SearchClient, NO_ANSWER, NO_LINK};

const LINK_KEYWORDS: &[&str] = &["link", "website"];

/// Which responder handles a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Link,
    Search,
    Intent,
}

/// `message` must already be trimmed and lowercased.
pub fn route(message: &str) -> Route {
    if LINK_KEYWORDS.iter().any(|keyword| message.contains(keyword)) {
        Route::Link
    } else if message.contains('?') {
        Route::Search
    } else {
        Route::Intent
    }
}

pub struct ChatBot {
    classifier: IntentClassifier,
    search: Option<SearchClient>,
}

impl ChatBot {
    pub fn new(search: Option<SearchClient>) -> Self {
        Self {
            classifier: IntentClassifier::default(),
            search,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let search = config
            .serpapi_key
            .as_deref()
            .map(|key| SearchClient::new(&config.serpapi_url, key));
        if search.is_none() {
            info!("SERPAPI_KEY not set, web search disabled");
        }
        Self::new(search)
    }

    pub async fn reply(&self, message: &str) -> Result<String> {
        let message = message.trim().to_lowercase();

        match (route(&message), &self.search) {
            (Route::Link, Some(search)) => search.link(&message).await,
            (Route::Link, None) => Ok(NO_LINK.to_string()),
            (Route::Search, Some(search)) => search.answer(&message).await,
            (Route::Search, None) => Ok(NO_ANSWER.to_string()),
            (Route::Intent, _) => Ok(self.classifier.reply(&message).to_string()),
        }
    }
}
