use crate::api;
use crate::components::detection::{TimedDetection, now};
use crate::dom::DomField;
use crate::storage::LocalStore;
use crate::store::{Action, StoreContext};
use settings::SettingsError;
use settings::managers::ComponentManagers;
use settings::managers::shared_link::FRAGMENT_PREFIX;
use settings::models::{ChatMessage, Provider};
use settings::orchestrator::{SettingsElements, SettingsOrchestrator};
use settings::state::update_model_info_display;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys;
use yew::prelude::*;

/// One ref per element the settings core drives.
#[derive(Default, PartialEq)]
struct ElementRefs {
    api_key_input: NodeRef,
    api_key_detection: NodeRef,
    api_key_update_input: NodeRef,
    api_key_update_detection: NodeRef,
    api_key_status: NodeRef,
    model_input: NodeRef,
    system_prompt_input: NodeRef,
    provider_select: NodeRef,
    base_url_input: NodeRef,
    custom_url_group: NodeRef,
    azure_group: NodeRef,
    azure_api_base: NodeRef,
    azure_api_version: NodeRef,
    azure_deployment: NodeRef,
    title_input: NodeRef,
    subtitle_input: NodeRef,
    welcome_panel: NodeRef,
    tool_calling_checkbox: NodeRef,
    share_include_key: NodeRef,
}

impl ElementRefs {
    /// Only valid once the modal has rendered.
    fn elements(&self) -> SettingsElements {
        SettingsElements {
            api_key_input: DomField::from_node(&self.api_key_input),
            api_key_detection: DomField::from_node(&self.api_key_detection),
            api_key_update_input: DomField::from_node(&self.api_key_update_input),
            api_key_update_detection: DomField::from_node(&self.api_key_update_detection),
            api_key_status: DomField::from_node(&self.api_key_status),
            model_input: DomField::from_node(&self.model_input),
            system_prompt_input: DomField::from_node(&self.system_prompt_input),
            provider_select: DomField::from_node(&self.provider_select),
            base_url_input: DomField::from_node(&self.base_url_input),
            custom_url_group: DomField::from_node(&self.custom_url_group),
            azure_group: DomField::from_node(&self.azure_group),
            azure_api_base: DomField::from_node(&self.azure_api_base),
            azure_api_version: DomField::from_node(&self.azure_api_version),
            azure_deployment: DomField::from_node(&self.azure_deployment),
            title_input: DomField::from_node(&self.title_input),
            subtitle_input: DomField::from_node(&self.subtitle_input),
            welcome_panel: DomField::from_node(&self.welcome_panel),
            tool_calling_checkbox: DomField::from_node(&self.tool_calling_checkbox),
            share_include_key: DomField::from_node(&self.share_include_key),
        }
    }
}

type SessionSlot = Rc<RefCell<Option<SettingsOrchestrator>>>;

fn with_managers<R>(slot: &SessionSlot, f: impl FnOnce(&ComponentManagers) -> R) -> Option<R> {
    let session = slot.borrow();
    session.as_ref().and_then(|o| o.managers()).map(f)
}

/// Saves every section. The title goes first since it picks the namespace
/// the rest is written to.
fn save_all(managers: &ComponentManagers) -> Result<(), SettingsError> {
    managers.title.save_from_fields()?;
    managers.api_key.save_from_fields()?;
    managers.base_url.save_from_fields()?;
    managers.model.save_from_field()?;
    managers.system_prompt.save_from_field()?;
    Ok(())
}

fn share_url(json: &str) -> Option<String> {
    let location = web_sys::window()?.location();
    let encoded = String::from(js_sys::encode_uri_component(json));
    Some(format!(
        "{}{}{}{FRAGMENT_PREFIX}{encoded}",
        location.origin().ok()?,
        location.pathname().ok()?,
        location.search().unwrap_or_default(),
    ))
}

#[function_component(SettingsModal)]
pub fn settings_modal() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");
    let refs = use_memo((), |_| ElementRefs::default());
    let session: SessionSlot = use_mut_ref(|| None);
    let error = use_state(|| None::<String>);

    // Build the managers once the refs point at real elements
    {
        let refs = refs.clone();
        let session = session.clone();
        let state = store.session.handle();
        use_effect_with((), move |_| {
            let elements = refs.elements();
            let local = Rc::new(LocalStore::new(state.clone()));
            let mut orchestrator = SettingsOrchestrator::new(local, state);
            orchestrator.initialize_component_managers(&elements);
            orchestrator.initialize_components(&elements, Some(&TimedDetection));
            *session.borrow_mut() = Some(orchestrator);

            move || {
                if let Some(mut orchestrator) = session.borrow_mut().take() {
                    orchestrator.teardown();
                }
            }
        });
    }

    let on_save = {
        let store = store.clone();
        let session = session.clone();
        let error = error.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            match with_managers(&session, save_all) {
                Some(Err(e)) => {
                    tracing::warn!("Failed to save settings: {e}");
                    error.set(Some(e.to_string()));
                }
                _ => {
                    update_model_info_display(&store.session.handle());
                    store.dispatch(Action::CloseModal);
                }
            }
        })
    };

    let on_cancel = {
        let store = store.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            store.dispatch(Action::CloseModal);
        })
    };

    let on_overlay_click = {
        let store = store.clone();
        Callback::from(move |_| store.dispatch(Action::CloseModal))
    };

    let on_get_started = {
        let session = session.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let result = with_managers(&session, |m| -> Result<(), SettingsError> {
                m.api_key.save_from_fields()?;
                m.welcome.mark_seen()
            });
            if let Some(Err(e)) = result {
                error.set(Some(e.to_string()));
            }
        })
    };

    let on_fetch_models = {
        let store = store.clone();
        let session = session.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let target = with_managers(&session, |m| -> Result<_, SettingsError> {
                m.base_url.save_from_fields()?;
                Ok((m.base_url.base_url()?, m.api_key.api_key()?, m.model.clone()))
            });
            let (base_url, api_key, model) = match target {
                Some(Ok(target)) => target,
                Some(Err(e)) => {
                    error.set(Some(e.to_string()));
                    return;
                }
                None => return,
            };

            let store = store.clone();
            let error = error.clone();
            yew::platform::spawn_local(async move {
                match api::fetch_models(&base_url, api_key.as_ref()).await {
                    Ok(ids) => {
                        store.dispatch(Action::SetModels(ids.clone()));
                        if let Err(e) = model.apply_fetched_models(ids, now()) {
                            tracing::warn!("Failed to apply fetched models: {e}");
                        }
                        error.set(None);
                    }
                    Err(e) => {
                        tracing::error!("Failed to fetch models: {:?}", e);
                        error.set(Some(format!("Could not fetch models: {e}")));
                    }
                }
            });
        })
    };

    let on_share = {
        let store = store.clone();
        let session = session.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let conversation: Vec<ChatMessage> = store
                .messages
                .iter()
                .filter(|m| !m.is_system())
                .cloned()
                .collect();
            let json = with_managers(&session, |m| -> Result<String, SettingsError> {
                let mut payload = m
                    .shared_link
                    .create_payload(m.link_targets(), m.model.current_model()?)?;
                payload.messages = conversation;
                payload.to_json()
            });
            let url = match json {
                Some(Ok(json)) => share_url(&json),
                Some(Err(e)) => {
                    error.set(Some(e.to_string()));
                    return;
                }
                None => return,
            };
            let Some(url) = url else {
                return;
            };

            let store = store.clone();
            yew::platform::spawn_local(async move {
                if let Some(window) = web_sys::window() {
                    let promise = window.navigator().clipboard().write_text(&url);
                    match JsFuture::from(promise).await {
                        Ok(_) => store.dispatch(Action::AppendMessage(ChatMessage::system(
                            "Share link copied to clipboard",
                        ))),
                        Err(e) => tracing::warn!("Clipboard write failed: {e:?}"),
                    }
                }
            });
        })
    };

    let on_clear = {
        let store = store.clone();
        let session = session.clone();
        let refs = refs.clone();
        Callback::from(move |_: MouseEvent| {
            let confirmed = web_sys::window()
                .and_then(|w| {
                    w.confirm_with_message("Clear all settings? This cannot be undone.")
                        .ok()
                })
                == Some(true);
            if !confirmed {
                return;
            }

            let elements = refs.elements();
            let close_requested = Cell::new(false);
            let report = {
                let store = store.clone();
                move |text: &str| store.dispatch(Action::AppendMessage(ChatMessage::system(text)))
            };
            let cleared = match session.borrow_mut().as_mut() {
                Some(orchestrator) => orchestrator.clear_all_settings(
                    &elements,
                    Some(&|| close_requested.set(true)),
                    &report,
                ),
                None => false,
            };

            // Closing unmounts the modal, which needs the session slot back
            if cleared {
                update_model_info_display(&store.session.handle());
            }
            if close_requested.get() {
                store.dispatch(Action::CloseModal);
            }
        })
    };

    html! {
        <div class="modal-overlay" onclick={on_overlay_click}>
            <div class="modal-content" onclick={|e: MouseEvent| e.stop_propagation()}>
                <div class="modal-header">
                    <h2 class="modal-title">{"Settings"}</h2>
                    <button class="close-btn" onclick={on_cancel.clone()}>{"×"}</button>
                </div>

                <div class="modal-body">
                    <div class="welcome-panel" ref={refs.welcome_panel.clone()} hidden={true}>
                        <p>{"Paste an API key to get started. The provider is picked for you."}</p>
                        <input type="password" class="form-input"
                            ref={refs.api_key_input.clone()}
                            placeholder="sk-..."
                        />
                        <div class="detection-hint" ref={refs.api_key_detection.clone()} hidden={true}></div>
                        <button class="btn btn-primary btn-sm" onclick={on_get_started}>{"Get started"}</button>
                    </div>

                    if let Some(message) = &*error {
                        <div class="form-error">{message}</div>
                    }

                    <div class="form-group">
                        <label class="form-label">{"API Key"}</label>
                        <div class="key-status" ref={refs.api_key_status.clone()} hidden={true}></div>
                        <input type="password" class="form-input"
                            ref={refs.api_key_update_input.clone()}
                            placeholder="Paste a new key to replace the current one"
                        />
                        <div class="detection-hint" ref={refs.api_key_update_detection.clone()} hidden={true}></div>
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"Provider"}</label>
                        <select class="form-select" ref={refs.provider_select.clone()}>
                            {for Provider::ALL.iter().map(|p| html! {
                                <option value={p.as_str()}>{p.display_name()}</option>
                            })}
                        </select>
                    </div>

                    <div class="form-group" ref={refs.custom_url_group.clone()} hidden={true}>
                        <label class="form-label">{"API Base URL"}</label>
                        <input type="text" class="form-input"
                            ref={refs.base_url_input.clone()}
                            placeholder="http://localhost:8000/v1"
                        />
                    </div>

                    <div class="form-group" ref={refs.azure_group.clone()} hidden={true}>
                        <label class="form-label">{"Azure API Base"}</label>
                        <input type="text" class="form-input"
                            ref={refs.azure_api_base.clone()}
                            placeholder="https://<resource>.openai.azure.com"
                        />
                        <div class="form-grid-2">
                            <div class="form-group">
                                <label class="form-label">{"API Version"}</label>
                                <input type="text" class="form-input" ref={refs.azure_api_version.clone()} />
                            </div>
                            <div class="form-group">
                                <label class="form-label">{"Deployment"}</label>
                                <input type="text" class="form-input" ref={refs.azure_deployment.clone()} />
                            </div>
                        </div>
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"Model"}</label>
                        <div class="input-with-action">
                            <input type="text" class="form-input" list="model-options"
                                ref={refs.model_input.clone()}
                            />
                            <button class="btn btn-secondary btn-sm" onclick={on_fetch_models}>{"Fetch models"}</button>
                        </div>
                        <datalist id="model-options">
                            {for store.models.iter().map(|id| html! { <option value={id.clone()} /> })}
                        </datalist>
                    </div>

                    <div class="form-group">
                        <label class="form-label">{"System Prompt"}</label>
                        <textarea class="form-textarea" rows="4" ref={refs.system_prompt_input.clone()} />
                    </div>

                    <details class="model-config-section">
                        <summary>{"Appearance and sharing"}</summary>
                        <div class="model-config-content">
                            <div class="form-grid-2">
                                <div class="form-group">
                                    <label class="form-label">{"Title"}</label>
                                    <input type="text" class="form-input" ref={refs.title_input.clone()} />
                                </div>
                                <div class="form-group">
                                    <label class="form-label">{"Subtitle"}</label>
                                    <input type="text" class="form-input" ref={refs.subtitle_input.clone()} />
                                </div>
                            </div>
                            <label class="checkbox-label">
                                <input type="checkbox" ref={refs.tool_calling_checkbox.clone()} />
                                {"Enable tool calling"}
                            </label>
                            <label class="checkbox-label">
                                <input type="checkbox" ref={refs.share_include_key.clone()} />
                                {"Include API key in share link"}
                            </label>
                            <button class="btn btn-secondary btn-sm" onclick={on_share}>{"Copy share link"}</button>
                        </div>
                    </details>

                    <div class="form-actions">
                        <button class="btn btn-danger" onclick={on_clear}>{"Clear all settings"}</button>
                        <button class="btn btn-secondary" onclick={on_cancel}>{"Cancel"}</button>
                        <button class="btn btn-primary" onclick={on_save}>{"Save Settings"}</button>
                    </div>
                </div>
            </div>
        </div>
    }
}
