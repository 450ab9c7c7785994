use settings::ui::{Field, FieldHandle};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::NodeRef;

/// A rendered element handed to the settings core.
///
/// Form controls expose their value; checkboxes read and write `"true"` or
/// `"false"`. Anything else exposes its text content.
pub struct DomField {
    element: Element,
}

impl DomField {
    pub fn from_node(node: &NodeRef) -> Option<Field> {
        let element = node.cast::<Element>()?;
        Some(Rc::new(Self { element }))
    }

    fn checkbox(&self) -> Option<&HtmlInputElement> {
        self.element
            .dyn_ref::<HtmlInputElement>()
            .filter(|input| input.type_() == "checkbox")
    }

    fn listen(&self, event: &str, listener: Box<dyn Fn()>) {
        let closure = Closure::wrap(listener);
        if let Err(e) = self
            .element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!("Failed to attach {event} listener: {e:?}");
            return;
        }
        // The element owns the listener for the rest of its life
        closure.forget();
    }
}

impl FieldHandle for DomField {
    fn value(&self) -> String {
        if let Some(checkbox) = self.checkbox() {
            return checkbox.checked().to_string();
        }
        if let Some(input) = self.element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = self.element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(textarea) = self.element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.value()
        } else {
            self.element.text_content().unwrap_or_default()
        }
    }

    fn set_value(&self, value: &str) {
        if let Some(checkbox) = self.checkbox() {
            checkbox.set_checked(value == "true");
        } else if let Some(input) = self.element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = self.element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(textarea) = self.element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        } else {
            self.element.set_text_content(Some(value));
        }
    }

    fn show(&self) {
        let _ = self.element.remove_attribute("hidden");
    }

    fn hide(&self) {
        let _ = self.element.set_attribute("hidden", "");
    }

    fn add_change_listener(&self, listener: Box<dyn Fn()>) {
        let is_choice =
            self.checkbox().is_some() || self.element.dyn_ref::<HtmlSelectElement>().is_some();
        self.listen(if is_choice { "change" } else { "input" }, listener);
    }

    fn add_blur_listener(&self, listener: Box<dyn Fn()>) {
        self.listen("blur", listener);
    }
}
