//! The chat widget controller.
//!
//! [`ChatWidget`] owns no UI of its own: it is handed an input, a message
//! list and an endpoint, and turns form submissions into one request and one
//! reply bubble each.

pub mod markup;
pub mod memory;
pub mod ordering;
pub mod view;

use std::cell::RefCell;
use std::str::FromStr;

use log::{debug, error, info};

use crate::client::ChatEndpoint;
use crate::error::{ConfigError, EndpointError};
use crate::protocol::{ChatRequest, ChatResponse, Sender};

pub use markup::Markup;
pub use ordering::{Placement, ReplyOrder, Sequencer};
pub use view::{Bubble, BubbleBody, MessageInput, MessageList, SubmitEvent};

/// Shown in place of a reply when the endpoint call fails.
pub const FAILURE_TEXT: &str = "Sorry, the chat service could not be reached.";

/// How bot replies are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyFormat {
    #[default]
    Text,
    /// Replies are sanitized and rendered as HTML; links survive.
    Markup,
}

impl FromStr for ReplyFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ReplyFormat::Text),
            "markup" | "html" => Ok(ReplyFormat::Markup),
            other => Err(ConfigError::ReplyFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetOptions {
    pub reply_order: ReplyOrder,
    pub reply_format: ReplyFormat,
}

/// A submission that has been rendered and is waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    seq: u64,
    request: ChatRequest,
}

impl PendingReply {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// What happened to the reply of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The reply bubble was appended.
    Rendered,
    /// The request failed and an error bubble was appended.
    Failed,
    /// Resolved, but held until an earlier submission resolves.
    Deferred,
    /// A newer reply was already shown; this one was discarded.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    Sent { seq: u64, delivery: Delivery },
}

type Reply = Result<ChatResponse, EndpointError>;

pub struct ChatWidget<I, L, E> {
    input: I,
    list: L,
    endpoint: E,
    reply_format: ReplyFormat,
    sequencer: RefCell<Sequencer<Reply>>,
}

impl<I, L, E> ChatWidget<I, L, E>
where
    I: MessageInput,
    L: MessageList,
    E: ChatEndpoint,
{
    pub fn new(input: I, list: L, endpoint: E) -> Self {
        Self::with_options(input, list, endpoint, WidgetOptions::default())
    }

    pub fn with_options(input: I, list: L, endpoint: E, options: WidgetOptions) -> Self {
        Self {
            input,
            list,
            endpoint,
            reply_format: options.reply_format,
            sequencer: RefCell::new(Sequencer::new(options.reply_order)),
        }
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn list(&self) -> &L {
        &self.list
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Handles one form submission end to end.
    pub async fn handle_submit(&self, event: &impl SubmitEvent) -> SubmitOutcome {
        match self.submit(event) {
            None => SubmitOutcome::Ignored,
            Some(pending) => {
                let seq = pending.seq;
                let delivery = self.deliver(pending).await;
                SubmitOutcome::Sent { seq, delivery }
            }
        }
    }

    /// The synchronous half of a submission: suppresses the default action,
    /// renders the user's message and clears the field.
    ///
    /// Must run inside the event callback so the default action is still
    /// cancellable. Returns `None` when the trimmed input is empty.
    pub fn submit(&self, event: &impl SubmitEvent) -> Option<PendingReply> {
        event.prevent_default();

        let message = self.input.value().trim().to_string();
        if message.is_empty() {
            debug!("Ignoring empty submission");
            return None;
        }

        let seq = self.sequencer.borrow_mut().issue();
        self.add_message(Sender::User, &message);
        self.input.clear();

        Some(PendingReply {
            seq,
            request: ChatRequest { message },
        })
    }

    /// The asynchronous half: sends the request and renders whatever the
    /// reply ordering allows once it resolves.
    pub async fn deliver(&self, pending: PendingReply) -> Delivery {
        let PendingReply { seq, request } = pending;
        info!("Sending chat message #{} ({} chars)", seq, request.message.len());

        let reply = self.endpoint.send(request).await;
        let failed = match &reply {
            Ok(_) => false,
            Err(e) => {
                error!("Chat message #{} got no reply: {}", seq, e);
                true
            }
        };

        let (placement, ready) = self.sequencer.borrow_mut().resolve(seq, reply, !failed);
        for (ready_seq, reply) in ready {
            self.render_reply(ready_seq, reply);
        }

        match placement {
            Placement::Ready if failed => Delivery::Failed,
            Placement::Ready => Delivery::Rendered,
            Placement::Deferred => {
                debug!("Reply #{} held behind an earlier message", seq);
                Delivery::Deferred
            }
            Placement::Dropped => {
                debug!("Reply #{} dropped, a newer reply is already shown", seq);
                Delivery::Dropped
            }
        }
    }

    /// Appends a text bubble and scrolls to the bottom. The text is never
    /// interpreted as markup.
    pub fn add_message(&self, sender: Sender, text: &str) {
        self.append(Bubble::text(sender, text));
    }

    /// Appends an HTML bubble and scrolls to the bottom.
    pub fn add_markup(&self, sender: Sender, markup: Markup) {
        self.append(Bubble::markup(sender, markup));
    }

    fn append(&self, bubble: Bubble) {
        self.list.append(bubble);
        self.list.scroll_to_bottom();
    }

    fn render_reply(&self, seq: u64, reply: Reply) {
        match reply {
            Ok(ChatResponse { response }) => {
                debug!("Rendering reply #{}", seq);
                match self.reply_format {
                    ReplyFormat::Text => self.add_message(Sender::Bot, &response),
                    ReplyFormat::Markup => self.add_markup(Sender::Bot, Markup::sanitize(&response)),
                }
            }
            Err(_) => self.append(Bubble::failure(FAILURE_TEXT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::memory::{MemoryInput, MemoryList, MemorySubmit};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future::poll_fn;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::task::Poll;

    type Responder = oneshot::Sender<Result<String, u16>>;

    #[derive(Default)]
    struct Script {
        requests: Vec<ChatRequest>,
        replies: HashMap<String, String>,
        deferred: bool,
        waiting: HashMap<String, Responder>,
    }

    /// Answers from a fixed table, or holds each request until the test
    /// calls `respond`.
    #[derive(Clone, Default)]
    struct ScriptedEndpoint {
        script: Rc<RefCell<Script>>,
    }

    impl ScriptedEndpoint {
        fn replying(pairs: &[(&str, &str)]) -> Self {
            let endpoint = Self::default();
            endpoint.script.borrow_mut().replies = pairs
                .iter()
                .map(|(m, r)| (m.to_string(), r.to_string()))
                .collect();
            endpoint
        }

        fn deferred() -> Self {
            let endpoint = Self::default();
            endpoint.script.borrow_mut().deferred = true;
            endpoint
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.script.borrow().requests.clone()
        }

        fn respond(&self, message: &str, reply: Result<&str, u16>) {
            let responder = self
                .script
                .borrow_mut()
                .waiting
                .remove(message)
                .expect("request was sent");
            let _ = responder.send(reply.map(str::to_string));
        }
    }

    impl ChatEndpoint for ScriptedEndpoint {
        async fn send(&self, request: ChatRequest) -> Result<ChatResponse, EndpointError> {
            let receiver = {
                let mut script = self.script.borrow_mut();
                script.requests.push(request.clone());
                if !script.deferred {
                    return match script.replies.get(&request.message) {
                        Some(response) => Ok(ChatResponse {
                            response: response.clone(),
                        }),
                        None => Err(EndpointError::Status { status: 500 }),
                    };
                }
                let (tx, rx) = oneshot::channel();
                script.waiting.insert(request.message, tx);
                rx
            };

            match receiver.await {
                Ok(Ok(response)) => Ok(ChatResponse { response }),
                Ok(Err(status)) => Err(EndpointError::Status { status }),
                Err(_) => Err(EndpointError::Status { status: 499 }),
            }
        }
    }

    async fn yield_now() {
        let mut yielded = false;
        poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }

    type TestWidget = ChatWidget<MemoryInput, MemoryList, ScriptedEndpoint>;

    fn widget_with(endpoint: ScriptedEndpoint, options: WidgetOptions) -> TestWidget {
        ChatWidget::with_options(MemoryInput::new(), MemoryList::new(), endpoint, options)
    }

    fn texts(list: &MemoryList) -> Vec<(String, String)> {
        list.bubbles()
            .iter()
            .map(|b| (b.class_name(), b.content().to_string()))
            .collect()
    }

    fn submit_text(widget: &TestWidget, text: &str) -> PendingReply {
        widget.input().type_text(text);
        widget.submit(&MemorySubmit::new()).expect("non-empty input")
    }

    #[test]
    fn hello_gets_one_user_and_one_bot_bubble() {
        let widget = widget_with(
            ScriptedEndpoint::replying(&[("Hello", "Hi there!")]),
            WidgetOptions::default(),
        );
        widget.input().type_text("Hello");
        let event = MemorySubmit::new();

        let outcome = block_on(widget.handle_submit(&event));

        assert!(event.default_prevented());
        assert_eq!(outcome, SubmitOutcome::Sent { seq: 0, delivery: Delivery::Rendered });
        assert_eq!(
            widget.endpoint().requests(),
            vec![ChatRequest { message: "Hello".to_string() }]
        );
        assert_eq!(
            texts(widget.list()),
            vec![
                ("message user".to_string(), "Hello".to_string()),
                ("message bot".to_string(), "Hi there!".to_string()),
            ]
        );
        assert_eq!(widget.input().value(), "");
    }

    #[test]
    fn whitespace_only_input_does_nothing() {
        let widget = widget_with(ScriptedEndpoint::replying(&[]), WidgetOptions::default());
        widget.input().type_text("   \t ");
        let event = MemorySubmit::new();

        let outcome = block_on(widget.handle_submit(&event));

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(event.default_prevented());
        assert!(widget.list().is_empty());
        assert!(widget.endpoint().requests().is_empty());
    }

    #[test]
    fn message_is_trimmed_before_render_and_send() {
        let widget = widget_with(
            ScriptedEndpoint::replying(&[("Hello", "Hi there!")]),
            WidgetOptions::default(),
        );
        widget.input().type_text("  Hello \n");

        block_on(widget.handle_submit(&MemorySubmit::new()));

        assert_eq!(widget.endpoint().requests()[0].message, "Hello");
        assert_eq!(widget.list().bubbles()[0].content(), "Hello");
    }

    #[test]
    fn input_is_cleared_before_reply_arrives() {
        let widget = widget_with(ScriptedEndpoint::deferred(), WidgetOptions::default());

        let pending = submit_text(&widget, "Hello");

        assert_eq!(widget.input().value(), "");
        assert_eq!(widget.list().len(), 1);
        assert_eq!(pending.request().message, "Hello");
        assert!(widget.endpoint().requests().is_empty());
    }

    #[test]
    fn list_is_scrolled_to_bottom_after_every_append() {
        let endpoint = ScriptedEndpoint::replying(&[("one", "1"), ("two", "2"), ("three", "3")]);
        let widget = ChatWidget::new(MemoryInput::new(), MemoryList::with_client_height(60), endpoint);

        for text in ["one", "two", "three"] {
            let pending = submit_text(&widget, text);
            assert_eq!(widget.list().scroll_top(), widget.list().max_scroll_top());
            block_on(widget.deliver(pending));
            assert_eq!(widget.list().scroll_top(), widget.list().max_scroll_top());
        }
        assert_eq!(widget.list().len(), 6);
        assert!(widget.list().scroll_top() > 0);
    }

    #[test]
    fn failed_request_shows_error_bubble() {
        let widget = widget_with(ScriptedEndpoint::replying(&[]), WidgetOptions::default());
        widget.input().type_text("anyone there?");

        let outcome = block_on(widget.handle_submit(&MemorySubmit::new()));

        assert_eq!(outcome, SubmitOutcome::Sent { seq: 0, delivery: Delivery::Failed });
        let bubbles = widget.list().bubbles();
        assert_eq!(bubbles.len(), 2);
        assert!(bubbles[1].error);
        assert_eq!(bubbles[1].class_name(), "message bot error");
        assert_eq!(bubbles[1].content(), FAILURE_TEXT);
    }

    #[test]
    fn text_is_never_rendered_as_markup() {
        let widget = widget_with(
            ScriptedEndpoint::replying(&[("<b>hi</b>", "<img src=x onerror=alert(1)>")]),
            WidgetOptions::default(),
        );
        widget.input().type_text("<b>hi</b>");

        block_on(widget.handle_submit(&MemorySubmit::new()));

        let bubbles = widget.list().bubbles();
        assert_eq!(bubbles[0].body, BubbleBody::Text("<b>hi</b>".to_string()));
        assert_eq!(
            bubbles[1].body,
            BubbleBody::Text("<img src=x onerror=alert(1)>".to_string())
        );
    }

    #[test]
    fn markup_replies_are_sanitized() {
        let reply = r#"<a href="https://example.com" target="_blank">🔗 Example</a><script>x()</script>"#;
        let widget = widget_with(
            ScriptedEndpoint::replying(&[("a link please", reply)]),
            WidgetOptions {
                reply_format: ReplyFormat::Markup,
                ..WidgetOptions::default()
            },
        );
        widget.input().type_text("a link please");

        block_on(widget.handle_submit(&MemorySubmit::new()));

        let bubbles = widget.list().bubbles();
        assert_eq!(bubbles[0].body, BubbleBody::Text("a link please".to_string()));
        assert_eq!(bubbles[1].body, BubbleBody::Markup(Markup::sanitize(reply)));
        assert!(!bubbles[1].content().contains("<script>"));
    }

    /// Submits "A" then "B" and resolves B before A.
    fn race(options: WidgetOptions) -> (TestWidget, Delivery, Delivery) {
        race_with(options, Ok("reply A"), Ok("reply B"))
    }

    fn race_with(
        options: WidgetOptions,
        reply_a: Result<&str, u16>,
        reply_b: Result<&str, u16>,
    ) -> (TestWidget, Delivery, Delivery) {
        let widget = widget_with(ScriptedEndpoint::deferred(), options);
        let a = submit_text(&widget, "A");
        let b = submit_text(&widget, "B");
        let endpoint = widget.endpoint().clone();

        let (delivery_a, delivery_b, ()) = block_on(async {
            futures::join!(widget.deliver(a), widget.deliver(b), async {
                endpoint.respond("B", reply_b);
                yield_now().await;
                endpoint.respond("A", reply_a);
            })
        });

        (widget, delivery_a, delivery_b)
    }

    #[test]
    fn replies_render_in_arrival_order_by_default() {
        let (widget, a, b) = race(WidgetOptions::default());

        assert_eq!((a, b), (Delivery::Rendered, Delivery::Rendered));
        let contents: Vec<_> = texts(widget.list()).into_iter().map(|(_, t)| t).collect();
        assert_eq!(contents, vec!["A", "B", "reply B", "reply A"]);
    }

    #[test]
    fn submission_order_holds_early_replies() {
        let (widget, a, b) = race(WidgetOptions {
            reply_order: ReplyOrder::Submission,
            ..WidgetOptions::default()
        });

        assert_eq!((a, b), (Delivery::Rendered, Delivery::Deferred));
        let contents: Vec<_> = texts(widget.list()).into_iter().map(|(_, t)| t).collect();
        assert_eq!(contents, vec!["A", "B", "reply A", "reply B"]);
    }

    #[test]
    fn latest_only_drops_stale_reply() {
        let (widget, a, b) = race(WidgetOptions {
            reply_order: ReplyOrder::LatestOnly,
            ..WidgetOptions::default()
        });

        assert_eq!((a, b), (Delivery::Dropped, Delivery::Rendered));
        let contents: Vec<_> = texts(widget.list()).into_iter().map(|(_, t)| t).collect();
        assert_eq!(contents, vec!["A", "B", "reply B"]);
    }

    #[test]
    fn submission_order_releases_held_reply_after_earlier_failure() {
        let (widget, a, b) = race_with(
            WidgetOptions {
                reply_order: ReplyOrder::Submission,
                ..WidgetOptions::default()
            },
            Err(500),
            Ok("reply B"),
        );

        assert_eq!((a, b), (Delivery::Failed, Delivery::Deferred));
        assert_eq!(
            texts(widget.list()),
            vec![
                ("message user".to_string(), "A".to_string()),
                ("message user".to_string(), "B".to_string()),
                ("message bot error".to_string(), FAILURE_TEXT.to_string()),
                ("message bot".to_string(), "reply B".to_string()),
            ]
        );
    }

    #[test]
    fn latest_only_keeps_older_answer_after_newer_failure() {
        let (widget, a, b) = race_with(
            WidgetOptions {
                reply_order: ReplyOrder::LatestOnly,
                ..WidgetOptions::default()
            },
            Ok("reply A"),
            Err(503),
        );

        assert_eq!((a, b), (Delivery::Rendered, Delivery::Failed));
        let contents: Vec<_> = texts(widget.list()).into_iter().map(|(_, t)| t).collect();
        assert_eq!(contents, vec!["A", "B", FAILURE_TEXT, "reply A"]);
    }

    #[test]
    fn reply_format_parses() {
        assert_eq!("markup".parse::<ReplyFormat>(), Ok(ReplyFormat::Markup));
        assert_eq!(" TEXT ".parse::<ReplyFormat>(), Ok(ReplyFormat::Text));
        assert!("rtf".parse::<ReplyFormat>().is_err());
    }
}
