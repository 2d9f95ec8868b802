//! In-memory views for running the widget without a browser.
//!
//! Handles are cheap to clone and clones share state, the way DOM element
//! handles do, so a test can keep one handle and give the other to the
//! widget.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::widget::view::{Bubble, MessageInput, MessageList, SubmitEvent};

#[derive(Debug, Clone, Default)]
pub struct MemoryInput {
    value: Rc<RefCell<String>>,
}

impl MemoryInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user typing into the field.
    pub fn type_text(&self, text: &str) {
        *self.value.borrow_mut() = text.to_string();
    }
}

impl MessageInput for MemoryInput {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn clear(&self) {
        self.value.borrow_mut().clear();
    }
}

/// Height of one bubble in the list's scroll model.
pub const BUBBLE_HEIGHT: u32 = 40;

fn content_height(bubbles: usize) -> u32 {
    u32::try_from(bubbles)
        .unwrap_or(u32::MAX)
        .saturating_mul(BUBBLE_HEIGHT)
}

#[derive(Debug)]
struct ListState {
    bubbles: Vec<Bubble>,
    client_height: u32,
    scroll_top: u32,
}

#[derive(Debug, Clone)]
pub struct MemoryList {
    state: Rc<RefCell<ListState>>,
}

impl Default for MemoryList {
    fn default() -> Self {
        Self::with_client_height(200)
    }
}

impl MemoryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_height(client_height: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(ListState {
                bubbles: Vec::new(),
                client_height,
                scroll_top: 0,
            })),
        }
    }

    pub fn bubbles(&self) -> Vec<Bubble> {
        self.state.borrow().bubbles.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scroll_height(&self) -> u32 {
        let state = self.state.borrow();
        content_height(state.bubbles.len()).max(state.client_height)
    }

    pub fn scroll_top(&self) -> u32 {
        self.state.borrow().scroll_top
    }

    /// Largest scroll offset: the bottom of the content is in view.
    pub fn max_scroll_top(&self) -> u32 {
        self.scroll_height() - self.state.borrow().client_height
    }
}

impl MessageList for MemoryList {
    fn append(&self, bubble: Bubble) {
        self.state.borrow_mut().bubbles.push(bubble);
    }

    fn scroll_to_bottom(&self) {
        let bottom = self.max_scroll_top();
        self.state.borrow_mut().scroll_top = bottom;
    }
}

#[derive(Debug, Default)]
pub struct MemorySubmit {
    prevented: Cell<bool>,
}

impl MemorySubmit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

impl SubmitEvent for MemorySubmit {
    fn prevent_default(&self) {
        self.prevented.set(true);
    }
}
