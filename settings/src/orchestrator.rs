//! Construction, initialization and teardown of one settings session.

use std::cell::RefCell;
use std::rc::Rc;

use crate::debounce::{DetectionConfig, DetectionDebouncer, DetectionHook};
use crate::error::SettingsError;
use crate::managers::{
    ApiKeyManager, AppliedLink, BaseUrlFields, BaseUrlResolver, ComponentManagers, ModelManager,
    ModelSelector, SharedLinkManager, SystemPromptManager, TitleManager, ToolCallingManager,
    WelcomeManager,
};
use crate::models::DetectionResult;
use crate::state::{MessagesSetter, ModelInfoUpdater, SessionKeyGetter, SharedStateHandle};
use crate::store::Store;
use crate::ui::Field;

/// Every DOM handle the settings modal can offer. Missing ones disable the
/// step that needs them.
#[derive(Clone, Default)]
pub struct SettingsElements {
    /// Key field of the first-run modal, with its detection hint
    pub api_key_input: Option<Field>,
    pub api_key_detection: Option<Field>,
    /// Replacement key field inside settings, with its detection hint
    pub api_key_update_input: Option<Field>,
    pub api_key_update_detection: Option<Field>,
    pub api_key_status: Option<Field>,
    pub model_input: Option<Field>,
    pub system_prompt_input: Option<Field>,
    pub provider_select: Option<Field>,
    pub base_url_input: Option<Field>,
    pub custom_url_group: Option<Field>,
    pub azure_group: Option<Field>,
    pub azure_api_base: Option<Field>,
    pub azure_api_version: Option<Field>,
    pub azure_deployment: Option<Field>,
    pub title_input: Option<Field>,
    pub subtitle_input: Option<Field>,
    pub welcome_panel: Option<Field>,
    pub tool_calling_checkbox: Option<Field>,
    pub share_include_key: Option<Field>,
}

/// Feeds input events and timer ticks into a debouncer. Implemented by the
/// browser binding.
pub trait DetectionInputHandler {
    fn attach(&self, debouncer: Rc<RefCell<DetectionDebouncer>>);
}

pub struct SettingsOrchestrator {
    store: Store,
    state: SharedStateHandle,
    detection: DetectionConfig,
    managers: Option<ComponentManagers>,
}

impl SettingsOrchestrator {
    pub fn new(store: Store, state: SharedStateHandle) -> Self {
        Self {
            store,
            state,
            detection: DetectionConfig::default(),
            managers: None,
        }
    }

    pub fn with_detection_config(mut self, config: DetectionConfig) -> Self {
        self.detection = config;
        self
    }

    pub fn state(&self) -> &SharedStateHandle {
        &self.state
    }

    pub fn managers(&self) -> Option<&ComponentManagers> {
        self.managers.as_ref()
    }

    /// Builds the managers, each from the handles it needs. Replaces any
    /// managers from a previous activation.
    pub fn initialize_component_managers(
        &mut self,
        elements: &SettingsElements,
    ) -> &ComponentManagers {
        let store = &self.store;
        let managers = ComponentManagers {
            api_key: ApiKeyManager::new(
                elements.api_key_input.clone(),
                elements.api_key_update_input.clone(),
                elements.api_key_status.clone(),
                store.clone(),
            ),
            model: Rc::new(ModelManager::new(
                elements.model_input.clone(),
                store.clone(),
                self.state.clone(),
            )),
            system_prompt: SystemPromptManager::new(
                elements.system_prompt_input.clone(),
                store.clone(),
            ),
            base_url: Rc::new(BaseUrlResolver::new(
                BaseUrlFields {
                    provider_select: elements.provider_select.clone(),
                    base_url_input: elements.base_url_input.clone(),
                    custom_url_group: elements.custom_url_group.clone(),
                    azure_group: elements.azure_group.clone(),
                    azure_api_base: elements.azure_api_base.clone(),
                    azure_api_version: elements.azure_api_version.clone(),
                    azure_deployment: elements.azure_deployment.clone(),
                },
                store.clone(),
            )),
            title: TitleManager::new(
                elements.title_input.clone(),
                elements.subtitle_input.clone(),
                store.clone(),
            ),
            welcome: WelcomeManager::new(elements.welcome_panel.clone(), store.clone()),
            shared_link: SharedLinkManager::new(
                elements.share_include_key.clone(),
                self.state.clone(),
            ),
            tool_calling: ToolCallingManager::new(
                elements.tool_calling_checkbox.clone(),
                store.clone(),
            ),
        };
        tracing::debug!("Component managers constructed");
        self.managers.insert(managers)
    }

    /// Initializes model, system prompt and base URL in that order, then wires
    /// key detection onto the initialized managers.
    pub fn initialize_components(
        &self,
        elements: &SettingsElements,
        input_handler: Option<&dyn DetectionInputHandler>,
    ) {
        let Some(managers) = &self.managers else {
            tracing::warn!("initialize_components called before managers exist");
            return;
        };

        managers.model.init();
        managers.system_prompt.init();
        managers.base_url.init();

        if let Some(handler) = input_handler {
            let hook = Self::auto_update_hook(managers);
            let pairs = [
                (&elements.api_key_input, &elements.api_key_detection),
                (
                    &elements.api_key_update_input,
                    &elements.api_key_update_detection,
                ),
            ];
            for (input, display) in pairs {
                let (Some(input), Some(display)) = (input, display) else {
                    tracing::warn!("Key field without detection hint, detection skipped");
                    continue;
                };
                let debouncer =
                    DetectionDebouncer::new(input.clone(), display.clone(), self.detection)
                        .with_hook(hook.clone());
                handler.attach(Rc::new(RefCell::new(debouncer)));
            }
        }

        managers.api_key.init();
        managers.title.init();
        managers.tool_calling.init();
        managers.welcome.init();
    }

    /// Detection → base URL → model, in that direction only.
    fn auto_update_hook(managers: &ComponentManagers) -> DetectionHook {
        let base_url = managers.base_url.clone();
        let model = managers.model.clone();
        Rc::new(move |detection: &DetectionResult| {
            if let Some(default_model) = base_url.update_provider_from_detection(detection)
                && let Err(e) = model.select_model(&default_model)
            {
                tracing::warn!("Failed to select detected model: {e}");
            }
        })
    }

    /// Binds the chat view callbacks. Calling it again replaces all three.
    pub fn update_state_callbacks(
        state: &SharedStateHandle,
        session_key_getter: SessionKeyGetter,
        messages_setter: MessagesSetter,
        update_model_info_display: ModelInfoUpdater,
    ) {
        state
            .borrow_mut()
            .bind(session_key_getter, messages_setter, update_model_info_display);
    }

    /// Wipes the active namespace. All-or-nothing as far as the UI goes:
    /// fields are reset only after the store reports success.
    ///
    /// Takes `&mut self` so no other settings mutation can run meanwhile.
    pub fn clear_all_settings(
        &mut self,
        elements: &SettingsElements,
        hide_settings_modal: Option<&dyn Fn()>,
        add_system_message: &dyn Fn(&str),
    ) -> bool {
        let outcome = self
            .store
            .clear_all_data()
            .map_err(|e| e.to_string())
            .and_then(|report| {
                if report.success {
                    Ok(report)
                } else {
                    Err(report.failure_reason().to_string())
                }
            });

        match outcome {
            Ok(report) => {
                for field in [
                    &elements.base_url_input,
                    &elements.api_key_input,
                    &elements.api_key_update_input,
                    &elements.system_prompt_input,
                ]
                .into_iter()
                .flatten()
                {
                    field.set_value("");
                }
                match &self.managers {
                    Some(managers) => managers.api_key.refresh_status(),
                    None => {
                        if let Some(status) = &elements.api_key_status {
                            status.hide();
                        }
                    }
                }
                if let Some(hide) = hide_settings_modal {
                    hide();
                }
                let count = report.cleared_keys.len();
                tracing::info!("Cleared {count} settings");
                add_system_message(&format!(
                    "All settings cleared. Removed {count} stored item(s)."
                ));
                true
            }
            Err(reason) => {
                tracing::error!("Failed to clear settings: {reason}");
                add_system_message(&format!("Error clearing settings: {reason}"));
                false
            }
        }
    }

    /// Defers `model` until the model list has been fetched.
    pub fn set_pending_shared_model(managers: &ComponentManagers, model: &str) {
        if model.trim().is_empty() {
            return;
        }
        managers.model.set_pending_shared_model(model);
    }

    /// Applies a decoded shared-link fragment. `Ok(None)` when the fragment is
    /// not a shared link.
    pub fn apply_shared_link(&self, fragment: &str) -> Result<Option<AppliedLink>, SettingsError> {
        let Some(managers) = &self.managers else {
            tracing::warn!("Shared link ignored, settings are not initialized");
            return Ok(None);
        };
        let Some(payload) = SharedLinkManager::payload_from_fragment(fragment) else {
            return Ok(None);
        };
        let applied = managers
            .shared_link
            .apply(payload?, managers.link_targets())?;
        Ok(Some(applied))
    }

    /// Drops every manager; the next activation builds fresh ones.
    pub fn teardown(&mut self) {
        if self.managers.take().is_some() {
            tracing::debug!("Settings session torn down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::{ChangeOutcome, DebounceState};
    use crate::models::{ChatMessage, Provider};
    use crate::state::{self, SharedState};
    use crate::testing::{ClearBehavior, MemoryStore, MockField, field};
    use crate::ui::FieldHandle;
    use std::cell::Cell;
    use std::time::Duration;

    const OPENAI_KEY: &str = "sk-proj-abcdefghijklmnopqrstuvwxyz0123456789ABCD";

    /// Records the debouncers it is handed instead of wiring DOM events.
    #[derive(Default)]
    struct RecordingHandler {
        attached: RefCell<Vec<Rc<RefCell<DetectionDebouncer>>>>,
    }

    impl DetectionInputHandler for RecordingHandler {
        fn attach(&self, debouncer: Rc<RefCell<DetectionDebouncer>>) {
            self.attached.borrow_mut().push(debouncer);
        }
    }

    struct Session {
        store: Rc<MemoryStore>,
        key_input: Rc<MockField>,
        key_hint: Rc<MockField>,
        base_url: Rc<MockField>,
        provider: Rc<MockField>,
        prompt: Rc<MockField>,
        model: Rc<MockField>,
        elements: SettingsElements,
        orchestrator: SettingsOrchestrator,
    }

    fn session() -> Session {
        let store = MemoryStore::new();
        let key_input = MockField::new("");
        let key_hint = MockField::hidden();
        let base_url = MockField::new("");
        let provider = MockField::new("");
        let prompt = MockField::new("");
        let model = MockField::new("");
        let elements = SettingsElements {
            api_key_input: Some(field(&key_input)),
            api_key_detection: Some(field(&key_hint)),
            base_url_input: Some(field(&base_url)),
            provider_select: Some(field(&provider)),
            system_prompt_input: Some(field(&prompt)),
            model_input: Some(field(&model)),
            ..Default::default()
        };
        let orchestrator = SettingsOrchestrator::new(store.clone(), SharedState::new_handle());
        Session {
            store,
            key_input,
            key_hint,
            base_url,
            provider,
            prompt,
            model,
            elements,
            orchestrator,
        }
    }

    #[test]
    fn constructs_all_managers() {
        let mut s = session();
        assert!(s.orchestrator.managers().is_none());
        s.orchestrator.initialize_component_managers(&s.elements);
        assert!(s.orchestrator.managers().is_some());
        s.orchestrator.teardown();
        assert!(s.orchestrator.managers().is_none());
    }

    #[test]
    fn initialize_components_before_managers_is_a_no_op() {
        let s = session();
        let handler = RecordingHandler::default();
        s.orchestrator
            .initialize_components(&s.elements, Some(&handler));
        assert!(handler.attached.borrow().is_empty());
    }

    #[test]
    fn detection_only_wired_for_complete_pairs() {
        let mut s = session();
        s.orchestrator.initialize_component_managers(&s.elements);
        let handler = RecordingHandler::default();
        s.orchestrator
            .initialize_components(&s.elements, Some(&handler));
        // The update field has no hint element in this layout
        assert_eq!(handler.attached.borrow().len(), 1);
    }

    #[test]
    fn detection_updates_provider_and_model() {
        let mut s = session();
        s.store.data.borrow_mut().system_prompt = Some("Be kind.".into());
        s.orchestrator.initialize_component_managers(&s.elements);
        let handler = RecordingHandler::default();
        s.orchestrator
            .initialize_components(&s.elements, Some(&handler));
        assert_eq!(s.prompt.value(), "Be kind.");

        let debouncer = handler.attached.borrow()[0].clone();
        s.key_input.type_value(OPENAI_KEY);
        let ChangeOutcome::Scheduled { ticket, .. } =
            debouncer.borrow_mut().handle_change(Duration::ZERO)
        else {
            panic!("detection was not scheduled");
        };
        assert!(debouncer.borrow_mut().handle_timer(ticket).is_some());

        assert_eq!(debouncer.borrow().state(), DebounceState::Idle);
        assert!(s.key_hint.is_visible());
        assert_eq!(s.provider.value(), "openai");
        assert_eq!(s.base_url.value(), "https://api.openai.com/v1");
        assert_eq!(s.model.value(), "gpt-4o");
        let data = s.store.data.borrow();
        assert_eq!(data.selection.as_ref().map(|sel| sel.provider), Some(Provider::OpenAi));
        assert_eq!(data.model.as_deref(), Some("gpt-4o"));
        // Typing a key never persists it
        assert!(data.api_key.is_none());
    }

    #[test]
    fn clear_success_resets_fields_and_reports_count() {
        let mut s = session();
        {
            let mut data = s.store.data.borrow_mut();
            data.api_key = Some(crate::models::ApiKey::new("sk-proj-x"));
            data.model = Some("gpt-4o".into());
            data.system_prompt = Some("hi".into());
        }
        s.base_url.set_value("https://x/v1");
        s.key_input.set_value("sk-typed");
        s.prompt.set_value("hi");

        let closes = Cell::new(0);
        let messages = RefCell::new(Vec::new());
        let ok = s.orchestrator.clear_all_settings(
            &s.elements,
            Some(&|| closes.set(closes.get() + 1)),
            &|m: &str| messages.borrow_mut().push(m.to_string()),
        );

        assert!(ok);
        assert_eq!(s.base_url.value(), "");
        assert_eq!(s.key_input.value(), "");
        assert_eq!(s.prompt.value(), "");
        assert_eq!(closes.get(), 1);
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].contains('3'));
    }

    #[test]
    fn clear_success_resets_visible_key_ui() {
        let mut s = session();
        s.store.data.borrow_mut().api_key =
            Some(crate::models::ApiKey::new("sk-proj-abcdef1234"));
        let update = MockField::new("");
        let status = MockField::hidden();
        s.elements.api_key_update_input = Some(field(&update));
        s.elements.api_key_status = Some(field(&status));
        s.orchestrator.initialize_component_managers(&s.elements);
        s.orchestrator.initialize_components(&s.elements, None);
        assert!(status.is_visible());
        assert_eq!(status.value(), "Current key: ••••••••1234");

        update.type_value("sk-typed-replacement-key");
        assert!(s.orchestrator.clear_all_settings(&s.elements, None, &|_: &str| {}));

        assert_eq!(update.value(), "");
        assert!(!status.is_visible());
    }

    #[test]
    fn clear_before_managers_hides_key_status() {
        let mut s = session();
        let status = MockField::new("Current key: ••••••••1234");
        s.elements.api_key_status = Some(field(&status));
        assert!(s.orchestrator.clear_all_settings(&s.elements, None, &|_: &str| {}));
        assert!(!status.is_visible());
    }

    #[test]
    fn clear_failure_leaves_fields_untouched() {
        for behavior in [
            ClearBehavior::Report("storage locked".into()),
            ClearBehavior::Fault("quota exceeded".into()),
        ] {
            let mut s = session();
            *s.store.clear_behavior.borrow_mut() = behavior;
            s.base_url.set_value("https://x/v1");
            s.prompt.set_value("keep me");

            let closes = Cell::new(0);
            let messages = RefCell::new(Vec::new());
            let ok = s.orchestrator.clear_all_settings(
                &s.elements,
                Some(&|| closes.set(closes.get() + 1)),
                &|m: &str| messages.borrow_mut().push(m.to_string()),
            );

            assert!(!ok);
            assert_eq!(s.base_url.value(), "https://x/v1");
            assert_eq!(s.prompt.value(), "keep me");
            assert_eq!(closes.get(), 0);
            assert!(messages.borrow()[0].starts_with("Error clearing settings: "));
        }
    }

    #[test]
    fn clear_without_close_callback() {
        let mut s = session();
        let messages = RefCell::new(Vec::new());
        assert!(s.orchestrator.clear_all_settings(
            &s.elements,
            None,
            &|m: &str| messages.borrow_mut().push(m.to_string()),
        ));
        assert!(messages.borrow()[0].contains('0'));
    }

    #[test]
    fn rebinding_callbacks_drops_old_ones() {
        let s = session();
        let old = Rc::new(Cell::new(0));
        let new = Rc::new(Cell::new(0));

        let counter = old.clone();
        SettingsOrchestrator::update_state_callbacks(
            s.orchestrator.state(),
            Rc::new(|| Some("old".to_string())),
            Rc::new(move |_: Vec<ChatMessage>| counter.set(counter.get() + 1)),
            Rc::new(|| {}),
        );
        let counter = new.clone();
        SettingsOrchestrator::update_state_callbacks(
            s.orchestrator.state(),
            Rc::new(|| Some("new".to_string())),
            Rc::new(move |_: Vec<ChatMessage>| counter.set(counter.get() + 1)),
            Rc::new(|| {}),
        );

        state::set_messages(s.orchestrator.state(), Vec::new());
        assert_eq!(old.get(), 0);
        assert_eq!(new.get(), 1);
        assert_eq!(
            state::session_key(s.orchestrator.state()).as_deref(),
            Some("new")
        );
    }

    #[test]
    fn pending_shared_model_ignores_empty() {
        let mut s = session();
        let managers = s.orchestrator.initialize_component_managers(&s.elements);
        SettingsOrchestrator::set_pending_shared_model(managers, "  ");
        assert_eq!(managers.model.pending_shared_model(), None);
        SettingsOrchestrator::set_pending_shared_model(managers, "gpt-4o-mini");
        assert_eq!(
            managers.model.pending_shared_model().as_deref(),
            Some("gpt-4o-mini")
        );
    }

    #[test]
    fn shared_link_fragment_is_applied() {
        let mut s = session();
        s.orchestrator.initialize_component_managers(&s.elements);
        let applied = s
            .orchestrator
            .apply_shared_link(r##"#shared={"provider":"groq","model":"llama-3.3-70b-versatile"}"##)
            .unwrap()
            .unwrap();
        assert_eq!(applied.provider, Some(Provider::Groq));
        let managers = s.orchestrator.managers().unwrap();
        assert_eq!(
            managers.model.pending_shared_model().as_deref(),
            Some("llama-3.3-70b-versatile")
        );
        assert_eq!(s.orchestrator.apply_shared_link("#about").unwrap(), None);
        assert!(s.orchestrator.apply_shared_link("#shared=oops").is_err());
    }
}
