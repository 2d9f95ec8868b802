use crate::protocol::Sender;
use crate::widget::markup::Markup;

/// Class prefix shared by every bubble; the sender name follows it.
pub const BUBBLE_CLASS: &str = "message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BubbleBody {
    /// Rendered through a text-node API, never parsed.
    Text(String),
    /// Rendered as HTML.
    Markup(Markup),
}

/// One rendered chat message node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub sender: Sender,
    pub body: BubbleBody,
    pub error: bool,
}

impl Bubble {
    pub fn text(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            body: BubbleBody::Text(text.into()),
            error: false,
        }
    }

    pub fn markup(sender: Sender, markup: Markup) -> Self {
        Self {
            sender,
            body: BubbleBody::Markup(markup),
            error: false,
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            body: BubbleBody::Text(text.into()),
            error: true,
        }
    }

    /// `message user`, `message bot`, or `message bot error`.
    pub fn class_name(&self) -> String {
        let mut class = format!("{} {}", BUBBLE_CLASS, self.sender.as_str());
        if self.error {
            class.push_str(" error");
        }
        class
    }

    /// The text, or the markup source for markup bodies.
    pub fn content(&self) -> &str {
        match &self.body {
            BubbleBody::Text(text) => text,
            BubbleBody::Markup(markup) => markup.as_str(),
        }
    }
}

/// The single-line text field the user types into.
pub trait MessageInput {
    fn value(&self) -> String;
    fn clear(&self);
}

/// Append-only, scrollable container of bubbles.
pub trait MessageList {
    fn append(&self, bubble: Bubble);
    fn scroll_to_bottom(&self);
}

/// A form submission whose default action can be suppressed.
pub trait SubmitEvent {
    fn prevent_default(&self);
}
