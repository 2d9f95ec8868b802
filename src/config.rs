//! Settings for the server (environment) and the widget (form attributes).

use std::env;

use crate::client::DEFAULT_ENDPOINT_PATH;
use crate::error::ConfigError;
use crate::widget::{ReplyFormat, ReplyOrder, WidgetOptions};

pub const DEFAULT_SERPAPI_URL: &str = "https://serpapi.com/search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
    /// Web search is disabled when unset.
    pub serpapi_key: Option<String>,
    pub serpapi_url: String,
}

impl ServerConfig {
    /// Reads the process environment. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("CHAT_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Port(raw))?,
            None => 8080,
        };

        Ok(Self {
            host: lookup("CHAT_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            templates_dir: lookup("TEMPLATES_DIR").unwrap_or_else(|| "templates".to_string()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            serpapi_key: lookup("SERPAPI_KEY").filter(|key| !key.trim().is_empty()),
            serpapi_url: lookup("SERPAPI_URL").unwrap_or_else(|| DEFAULT_SERPAPI_URL.to_string()),
        })
    }
}

pub const DEFAULT_FORM_ID: &str = "chat-form";
pub const DEFAULT_INPUT_ID: &str = "user-input";
pub const DEFAULT_LIST_ID: &str = "chat-box";

/// Where the widget mounts and how it behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub form_id: String,
    pub input_id: String,
    pub list_id: String,
    pub endpoint_path: String,
    pub options: WidgetOptions,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            form_id: DEFAULT_FORM_ID.to_string(),
            input_id: DEFAULT_INPUT_ID.to_string(),
            list_id: DEFAULT_LIST_ID.to_string(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            options: WidgetOptions::default(),
        }
    }
}

impl WidgetConfig {
    pub fn with_ids(form_id: &str, input_id: &str, list_id: &str) -> Self {
        Self {
            form_id: form_id.to_string(),
            input_id: input_id.to_string(),
            list_id: list_id.to_string(),
            ..Self::default()
        }
    }

    /// Applies `data-endpoint`, `data-reply-order` and `data-reply-format`
    /// as read from the form element.
    pub fn apply_attributes(
        mut self,
        attribute: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = attribute("data-endpoint").filter(|p| !p.trim().is_empty()) {
            self.endpoint_path = path.trim().to_string();
        }
        if let Some(order) = attribute("data-reply-order") {
            self.options.reply_order = order.parse::<ReplyOrder>()?;
        }
        if let Some(format) = attribute("data-reply-format") {
            self.options.reply_format = format.parse::<ReplyFormat>()?;
        }
        Ok(self)
    }
}
