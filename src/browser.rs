//! DOM binding for the widget, compiled for `wasm32` only.

use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlFormElement, HtmlInputElement};

use crate::client::HttpEndpoint;
use crate::config::WidgetConfig;
use crate::widget::{Bubble, BubbleBody, ChatWidget, MessageInput, MessageList, SubmitEvent};

pub struct DomInput(HtmlInputElement);

impl MessageInput for DomInput {
    fn value(&self) -> String {
        self.0.value()
    }

    fn clear(&self) {
        self.0.set_value("");
    }
}

pub struct DomList {
    document: Document,
    container: Element,
}

impl MessageList for DomList {
    fn append(&self, bubble: Bubble) {
        let node = match self.document.create_element("div") {
            Ok(node) => node,
            Err(e) => {
                warn!("Could not create message node: {:?}", e);
                return;
            }
        };
        node.set_class_name(&bubble.class_name());
        match &bubble.body {
            BubbleBody::Text(text) => node.set_text_content(Some(text)),
            BubbleBody::Markup(markup) => node.set_inner_html(markup.as_str()),
        }
        if let Err(e) = self.container.append_child(&node) {
            warn!("Could not append message node: {:?}", e);
        }
    }

    fn scroll_to_bottom(&self) {
        self.container.set_scroll_top(self.container.scroll_height());
    }
}

impl SubmitEvent for Event {
    fn prevent_default(&self) {
        Event::prevent_default(self);
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    let document = document()?;
    if document.get_element_by_id(crate::config::DEFAULT_FORM_ID).is_none() {
        info!("No chat form on this page; call mount_chat_widget to attach one");
        return Ok(());
    }
    mount(&document, WidgetConfig::default())
}

/// Attaches a widget to a form, input and list identified by id.
#[wasm_bindgen]
pub fn mount_chat_widget(form_id: &str, input_id: &str, list_id: &str) -> Result<(), JsValue> {
    mount(&document()?, WidgetConfig::with_ids(form_id, input_id, list_id))
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id `{id}`")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element `{id}` has the wrong type")))
}

fn mount(document: &Document, config: WidgetConfig) -> Result<(), JsValue> {
    let form: HtmlFormElement = element_by_id(document, &config.form_id)?;
    let input: HtmlInputElement = element_by_id(document, &config.input_id)?;
    let container: Element = element_by_id(document, &config.list_id)?;

    let config = config
        .apply_attributes(|name| form.get_attribute(name))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let origin = web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window available"))?
        .location()
        .origin()?;
    let endpoint = HttpEndpoint::new(&origin, &config.endpoint_path)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let widget = Rc::new(ChatWidget::with_options(
        DomInput(input),
        DomList {
            document: document.clone(),
            container,
        },
        endpoint,
        config.options,
    ));

    let on_submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(pending) = widget.submit(&event) {
            let widget = Rc::clone(&widget);
            wasm_bindgen_futures::spawn_local(async move {
                widget.deliver(pending).await;
            });
        }
    });
    form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    on_submit.forget();

    info!("Chat widget mounted on #{}", config.form_id);
    Ok(())
}
