use std::rc::Rc;

/// The only view of a DOM element the settings core gets.
///
/// `show` and `hide` must be idempotent. Setting the value of an element that
/// is not an input replaces its text.
pub trait FieldHandle {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn show(&self);
    fn hide(&self);
    fn add_change_listener(&self, listener: Box<dyn Fn()>);
    /// Elements that cannot take focus ignore blur listeners.
    fn add_blur_listener(&self, _listener: Box<dyn Fn()>) {}
}

pub type Field = Rc<dyn FieldHandle>;

/// Trimmed value of an optional field, empty when the field is missing.
pub fn trimmed_value(field: Option<&Field>) -> String {
    field.map(|f| f.value().trim().to_string()).unwrap_or_default()
}

/// Shows or hides `field` if it exists.
pub fn set_visible(field: Option<&Field>, visible: bool) {
    if let Some(field) = field {
        if visible {
            field.show();
        } else {
            field.hide();
        }
    }
}
