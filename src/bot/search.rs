//! Web search answers through SerpAPI.

use anyhow::{anyhow, Result};
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::widget::Markup;

pub const NO_ANSWER: &str = "Sorry, I couldn't find an answer.";
pub const NO_LINK: &str = "Sorry, I couldn't find a link for that.";

pub struct SearchClient {
    url: String,
    api_key: String,
    client: Client,
}

impl SearchClient {
    pub fn new(url: &str, api_key: &str) -> Self {
        info!("Web search enabled at: {}", url);
        Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    async fn search(&self, query: &str) -> Result<Value> {
        debug!("Searching for: {}", query);

        let response = self
            .client
            .get(&self.url)
            .query(&[("q", query), ("api_key", self.api_key.as_str()), ("engine", "google")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Search request failed with status {}: {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    pub async fn answer(&self, query: &str) -> Result<String> {
        let results = self.search(query).await?;
        Ok(extract_answer(&results).unwrap_or_else(|| NO_ANSWER.to_string()))
    }

    /// Link markup for the top result.
    pub async fn link(&self, query: &str) -> Result<String> {
        let results = self.search(query).await?;
        Ok(extract_link(&results)
            .map(Markup::into_string)
            .unwrap_or_else(|| NO_LINK.to_string()))
    }
}

/// Answer box first (answer, snippet, highlighted words), then the first
/// organic snippet.
pub fn extract_answer(results: &Value) -> Option<String> {
    if let Some(answer_box) = results.get("answer_box") {
        if let Some(answer) = answer_box.get("answer").and_then(Value::as_str) {
            return Some(answer.to_string());
        }
        if let Some(snippet) = answer_box.get("snippet").and_then(Value::as_str) {
            return Some(snippet.to_string());
        }
        if let Some(words) = answer_box.get("highlighted_words").and_then(Value::as_array) {
            let words: Vec<&str> = words.iter().filter_map(Value::as_str).collect();
            return Some(words.join(", "));
        }
    }

    results
        .get("organic_results")
        .and_then(|organic| organic.get(0))
        .and_then(|first| first.get("snippet"))
        .and_then(Value::as_str)
        .filter(|snippet| !snippet.is_empty())
        .map(str::to_string)
}

pub fn extract_link(results: &Value) -> Option<Markup> {
    let first = results.get("organic_results")?.get(0)?;
    let title = first.get("title").and_then(Value::as_str).unwrap_or("Link");
    let link = first.get("link").and_then(Value::as_str)?;
    Markup::link(link, &format!("🔗 {}", title))
}
