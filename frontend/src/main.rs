mod api;
mod components;
mod dom;
mod storage;
mod store;

use components::chat_log::ChatLog;
use components::detection::now;
use components::settings_modal::SettingsModal;
use settings::managers::ComponentManagers;
use settings::models::ChatMessage;
use settings::orchestrator::{SettingsElements, SettingsOrchestrator};
use settings::state::update_model_info_display;
use std::rc::Rc;
use store::{Action, ModalType, State, StoreContext};
use yew::prelude::*;

/// A shared model only sticks once the endpoint confirms it offers it.
fn resolve_shared_model(store: StoreContext, managers: &ComponentManagers) {
    let (base_url, api_key) = match (managers.base_url.base_url(), managers.api_key.api_key()) {
        (Ok(url), Ok(key)) => (url, key),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Cannot resolve shared model: {e}");
            return;
        }
    };
    let model = managers.model.clone();
    yew::platform::spawn_local(async move {
        match api::fetch_models(&base_url, api_key.as_ref()).await {
            Ok(ids) => {
                store.dispatch(Action::SetModels(ids.clone()));
                if let Err(e) = model.apply_fetched_models(ids, now()) {
                    tracing::warn!("Failed to select shared model: {e}");
                }
            }
            Err(e) => tracing::error!("Failed to fetch models: {:?}", e),
        }
    });
}

/// Applies a `#shared=` link from the address bar, once per page load.
fn apply_startup_link(store: &StoreContext) {
    let Some(fragment) = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .filter(|hash| !hash.is_empty())
    else {
        return;
    };
    let decoded = match web_sys::js_sys::decode_uri_component(&fragment) {
        Ok(decoded) => String::from(decoded),
        Err(_) => {
            tracing::warn!("Location fragment is not valid URI encoding");
            return;
        }
    };

    let state = store.session.handle();
    let local = Rc::new(storage::LocalStore::new(state.clone()));
    let mut orchestrator = SettingsOrchestrator::new(local, state);
    orchestrator.initialize_component_managers(&SettingsElements::default());
    match orchestrator.apply_shared_link(&decoded) {
        Ok(Some(applied)) => {
            store.dispatch(Action::AppendMessage(ChatMessage::system(applied.summary())));
            update_model_info_display(&store.session.handle());
            if applied.model.is_some()
                && let Some(managers) = orchestrator.managers()
            {
                resolve_shared_model(store.clone(), managers);
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to apply shared link: {e}");
            store.dispatch(Action::AppendMessage(ChatMessage::system(format!(
                "Could not load shared link: {e}"
            ))));
        }
    }
    orchestrator.teardown();
}

#[function_component(App)]
fn app() -> Html {
    let store = use_reducer(State::default);

    {
        let store = store.clone();
        use_effect_with((), move |_| {
            store.session.bind_chat_view(store.dispatcher());
            apply_startup_link(&store);
            || ()
        });
    }

    let open_settings = {
        let store = store.clone();
        Callback::from(move |_: MouseEvent| store.dispatch(Action::OpenModal(ModalType::Settings)))
    };

    html! {
        <ContextProvider<StoreContext> context={store.clone()}>
            <div class="app-container">
                <header class="app-header">
                    <div class="app-title">
                        <h1>{store.title.clone().unwrap_or_else(|| "Renoma".to_string())}</h1>
                        if let Some(subtitle) = &store.subtitle {
                            <span class="app-subtitle">{subtitle}</span>
                        }
                    </div>
                    if let Some(model) = &store.model_info {
                        <span class="model-info">{model}</span>
                    }
                    <button class="btn btn-secondary" onclick={open_settings}>{"Settings"}</button>
                </header>
                <div class="main-stage">
                    <ChatLog />
                </div>

                if store.modal_open == Some(ModalType::Settings) {
                    <SettingsModal />
                }
            </div>
        </ContextProvider<StoreContext>>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    yew::Renderer::<App>::new().render();
}
