use std::cell::RefCell;
use std::time::Duration;

use crate::error::SettingsError;
use crate::state::{SharedStateHandle, update_model_info_display};
use crate::store::Store;
use crate::ui::{Field, trimmed_value};

/// What detection and shared links need from the model manager.
pub trait ModelSelector {
    fn select_model(&self, model: &str) -> Result<(), SettingsError>;
    /// Remembers `model` until the next catalog fetch instead of selecting it
    /// now.
    fn set_pending_shared_model(&self, model: &str);
}

pub struct ModelManager {
    field: Option<Field>,
    store: Store,
    state: SharedStateHandle,
    models: RefCell<Vec<String>>,
    pending_shared_model: RefCell<Option<String>>,
}

impl ModelManager {
    pub fn new(field: Option<Field>, store: Store, state: SharedStateHandle) -> Self {
        Self {
            field,
            store,
            state,
            models: RefCell::new(Vec::new()),
            pending_shared_model: RefCell::new(None),
        }
    }

    pub fn init(&self) {
        let Some(field) = &self.field else {
            tracing::warn!("Model field missing, skipping model init");
            return;
        };
        match self.store.model() {
            Ok(model) => field.set_value(model.as_deref().unwrap_or_default()),
            Err(e) => tracing::warn!("Failed to read model: {e}"),
        }
    }

    pub fn current_model(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.store.model()?)
    }

    pub fn available_models(&self) -> Vec<String> {
        self.models.borrow().clone()
    }

    pub fn pending_shared_model(&self) -> Option<String> {
        self.pending_shared_model.borrow().clone()
    }

    /// Persists the model typed into the field.
    pub fn save_from_field(&self) -> Result<(), SettingsError> {
        let model = trimmed_value(self.field.as_ref());
        if model.is_empty() {
            return Ok(());
        }
        self.select_model(&model)
    }

    /// Stores a freshly fetched catalog and resolves a pending shared model
    /// against it.
    pub fn apply_fetched_models(
        &self,
        models: Vec<String>,
        fetched_at: Duration,
    ) -> Result<(), SettingsError> {
        tracing::info!("Fetched {} models", models.len());
        *self.models.borrow_mut() = models;
        self.state.borrow_mut().last_models_fetch_time = fetched_at;

        let pending = self.pending_shared_model.borrow_mut().take();
        if let Some(model) = pending {
            if self.models.borrow().contains(&model) {
                self.select_model(&model)?;
            } else {
                tracing::warn!("Shared model {model} is not offered by this endpoint");
            }
        }
        update_model_info_display(&self.state);
        Ok(())
    }
}

impl ModelSelector for ModelManager {
    fn select_model(&self, model: &str) -> Result<(), SettingsError> {
        let model = model.trim();
        if model.is_empty() {
            return Ok(());
        }
        if let Some(field) = &self.field {
            field.set_value(model);
        }
        self.store.save_model(model)?;
        update_model_info_display(&self.state);
        Ok(())
    }

    fn set_pending_shared_model(&self, model: &str) {
        *self.pending_shared_model.borrow_mut() = Some(model.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::FieldHandle;
    use crate::state::SharedState;
    use crate::testing::{MemoryStore, MockField, field};
    use std::cell::Cell;
    use std::rc::Rc;

    fn manager() -> (Rc<MemoryStore>, Rc<MockField>, SharedStateHandle, ModelManager) {
        let store = MemoryStore::new();
        let input = MockField::new("");
        let state = SharedState::new_handle();
        let manager = ModelManager::new(Some(field(&input)), store.clone(), state.clone());
        (store, input, state, manager)
    }

    #[test]
    fn select_persists_and_updates_field() {
        let (store, input, _, manager) = manager();
        manager.select_model(" gpt-4o ").unwrap();
        assert_eq!(input.value(), "gpt-4o");
        assert_eq!(store.data.borrow().model.as_deref(), Some("gpt-4o"));
        assert_eq!(manager.current_model().unwrap().as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn pending_model_waits_for_catalog() {
        let (store, input, state, manager) = manager();
        manager.set_pending_shared_model("llama-3.3-70b-versatile");
        assert_eq!(input.value(), "");
        assert!(store.data.borrow().model.is_none());

        manager
            .apply_fetched_models(
                vec!["gemma2-9b-it".into(), "llama-3.3-70b-versatile".into()],
                Duration::from_secs(42),
            )
            .unwrap();

        assert_eq!(input.value(), "llama-3.3-70b-versatile");
        assert_eq!(manager.pending_shared_model(), None);
        assert_eq!(state.borrow().last_models_fetch_time, Duration::from_secs(42));
        assert_eq!(manager.available_models().len(), 2);
    }

    #[test]
    fn pending_model_missing_from_catalog_is_dropped() {
        let (store, _, _, manager) = manager();
        manager.set_pending_shared_model("gpt-9");
        manager
            .apply_fetched_models(vec!["gpt-4o".into()], Duration::from_secs(1))
            .unwrap();
        assert_eq!(manager.pending_shared_model(), None);
        assert!(store.data.borrow().model.is_none());
    }

    #[test]
    fn fetch_refreshes_model_info_display() {
        let (_, _, state, manager) = manager();
        let refreshes = Rc::new(Cell::new(0));
        let counter = refreshes.clone();
        state.borrow_mut().bind(
            Rc::new(|| None::<String>),
            Rc::new(|_: Vec<crate::models::ChatMessage>| {}),
            Rc::new(move || counter.set(counter.get() + 1)),
        );
        manager
            .apply_fetched_models(Vec::new(), Duration::from_secs(1))
            .unwrap();
        assert_eq!(refreshes.get(), 1);
    }

    #[test]
    fn init_without_field_is_skipped() {
        let store = MemoryStore::new();
        let manager = ModelManager::new(None, store, SharedState::new_handle());
        manager.init();
        manager.select_model("gpt-4o").unwrap();
        assert_eq!(manager.current_model().unwrap().as_deref(), Some("gpt-4o"));
    }
}
