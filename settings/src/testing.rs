//! Test doubles for the UI and persistence collaborators.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{StoreError, StoreResult};
use crate::models::{
    ApiKey, AzureSettings, ClearReport, Provider, ProviderSelection, StoredSettings,
};
use crate::store::SettingsStore;
use crate::ui::{Field, FieldHandle};

#[derive(Default)]
pub struct MockField {
    value: RefCell<String>,
    visible: Cell<bool>,
    listeners: RefCell<Vec<Box<dyn Fn()>>>,
    pub set_calls: Cell<usize>,
}

impl MockField {
    pub fn new(value: &str) -> Rc<Self> {
        let field = Rc::new(Self::default());
        *field.value.borrow_mut() = value.to_string();
        field.visible.set(true);
        field
    }

    pub fn hidden() -> Rc<Self> {
        let field = Self::new("");
        field.visible.set(false);
        field
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Simulates the user typing: replaces the value and fires listeners.
    pub fn type_value(&self, value: &str) {
        *self.value.borrow_mut() = value.to_string();
        for listener in self.listeners.borrow().iter() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl FieldHandle for MockField {
    fn value(&self) -> String {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        self.set_calls.set(self.set_calls.get() + 1);
        *self.value.borrow_mut() = value.to_string();
    }

    fn show(&self) {
        self.visible.set(true);
    }

    fn hide(&self) {
        self.visible.set(false);
    }

    fn add_change_listener(&self, listener: Box<dyn Fn()>) {
        self.listeners.borrow_mut().push(listener);
    }
}

pub fn field(mock: &Rc<MockField>) -> Field {
    mock.clone()
}

pub enum ClearBehavior {
    Succeed,
    Report(String),
    Fault(String),
}

pub struct MemoryStore {
    pub data: RefCell<StoredSettings>,
    pub title: RefCell<Option<String>>,
    pub subtitle: RefCell<Option<String>>,
    pub clear_behavior: RefCell<ClearBehavior>,
    pub selection_writes: Cell<usize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            data: RefCell::default(),
            title: RefCell::default(),
            subtitle: RefCell::default(),
            clear_behavior: RefCell::new(ClearBehavior::Succeed),
            selection_writes: Cell::new(0),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }
}

impl SettingsStore for MemoryStore {
    fn base_url(&self) -> StoreResult<Option<String>> {
        Ok(self.data.borrow().selection.as_ref().map(|s| s.base_url.clone()))
    }

    fn base_url_provider(&self) -> StoreResult<Option<Provider>> {
        Ok(self.data.borrow().selection.as_ref().map(|s| s.provider))
    }

    fn save_provider_selection(&self, selection: &ProviderSelection) -> StoreResult<()> {
        self.selection_writes.set(self.selection_writes.get() + 1);
        self.data.borrow_mut().selection = Some(selection.clone());
        Ok(())
    }

    fn azure_settings(&self) -> StoreResult<Option<AzureSettings>> {
        Ok(self.data.borrow().azure.clone())
    }

    fn save_azure_settings(&self, azure: &AzureSettings) -> StoreResult<()> {
        self.data.borrow_mut().azure = Some(azure.clone());
        Ok(())
    }

    fn api_key(&self) -> StoreResult<Option<ApiKey>> {
        Ok(self.data.borrow().api_key.clone())
    }

    fn save_api_key(&self, key: &ApiKey) -> StoreResult<()> {
        self.data.borrow_mut().api_key = Some(key.clone());
        Ok(())
    }

    fn model(&self) -> StoreResult<Option<String>> {
        Ok(self.data.borrow().model.clone())
    }

    fn save_model(&self, model: &str) -> StoreResult<()> {
        self.data.borrow_mut().model = Some(model.to_string());
        Ok(())
    }

    fn system_prompt(&self) -> StoreResult<Option<String>> {
        Ok(self.data.borrow().system_prompt.clone())
    }

    fn save_system_prompt(&self, prompt: &str) -> StoreResult<()> {
        self.data.borrow_mut().system_prompt = Some(prompt.to_string());
        Ok(())
    }

    fn title(&self) -> StoreResult<Option<String>> {
        Ok(self.title.borrow().clone())
    }

    fn save_title(&self, title: &str) -> StoreResult<()> {
        *self.title.borrow_mut() = Some(title.to_string());
        Ok(())
    }

    fn subtitle(&self) -> StoreResult<Option<String>> {
        Ok(self.subtitle.borrow().clone())
    }

    fn save_subtitle(&self, subtitle: &str) -> StoreResult<()> {
        *self.subtitle.borrow_mut() = Some(subtitle.to_string());
        Ok(())
    }

    fn tool_calling_enabled(&self) -> StoreResult<bool> {
        Ok(self.data.borrow().tool_calling_enabled)
    }

    fn save_tool_calling_enabled(&self, enabled: bool) -> StoreResult<()> {
        self.data.borrow_mut().tool_calling_enabled = enabled;
        Ok(())
    }

    fn welcome_seen(&self) -> StoreResult<bool> {
        Ok(self.data.borrow().welcome_seen)
    }

    fn save_welcome_seen(&self, seen: bool) -> StoreResult<()> {
        self.data.borrow_mut().welcome_seen = seen;
        Ok(())
    }

    fn clear_all_data(&self) -> StoreResult<ClearReport> {
        match &*self.clear_behavior.borrow() {
            ClearBehavior::Succeed => {
                let keys = self.data.borrow().populated_keys();
                *self.data.borrow_mut() = StoredSettings::default();
                Ok(ClearReport::cleared(keys))
            }
            ClearBehavior::Report(error) => Ok(ClearReport::failed(error.clone())),
            ClearBehavior::Fault(error) => Err(StoreError::Backend(error.clone())),
        }
    }
}
