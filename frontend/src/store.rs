use crate::storage::LocalStore;
use settings::models::ChatMessage;
use settings::orchestrator::SettingsOrchestrator;
use settings::state::{
    SessionKeyGetter, SharedState, SharedStateHandle, update_model_info_display,
};
use settings::store::SettingsStore;
use std::fmt;
use std::rc::Rc;
use yew::prelude::*;

/// The settings session state shared with the chat view. Compared by
/// identity so the reducer state stays `PartialEq`.
#[derive(Clone)]
pub struct Session(SharedStateHandle);

impl Session {
    pub fn handle(&self) -> SharedStateHandle {
        self.0.clone()
    }

    /// Points the settings core at this chat view. Binding again replaces the
    /// previous callbacks.
    pub fn bind_chat_view(&self, dispatcher: UseReducerDispatcher<State>) {
        let local = LocalStore::new(self.0.clone());
        self.bind(
            Rc::new(crate::storage::session_key_from_location),
            Rc::new(move || Action::SetHeader {
                model: local.model().ok().flatten(),
                title: local.title().ok().flatten(),
                subtitle: local.subtitle().ok().flatten(),
            }),
            Rc::new(move |action: Action| dispatcher.dispatch(action)),
        );
    }

    /// The header is read again once bound: values read before the session
    /// key getter existed came from the default namespace.
    fn bind(
        &self,
        session_key: SessionKeyGetter,
        read_header: Rc<dyn Fn() -> Action>,
        send: Rc<dyn Fn(Action)>,
    ) {
        let messages = send.clone();
        SettingsOrchestrator::update_state_callbacks(
            &self.0,
            session_key,
            Rc::new(move |msgs: Vec<ChatMessage>| messages(Action::SetMessages(msgs))),
            Rc::new(move || send(read_header())),
        );
        update_model_info_display(&self.0);
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("bound", &self.0.borrow().is_bound())
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub messages: Vec<ChatMessage>,
    pub models: Vec<String>,
    pub model_info: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub modal_open: Option<ModalType>,
    pub session: Session,
}

impl Default for State {
    fn default() -> Self {
        let handle = SharedState::new_handle();
        let local = LocalStore::new(handle.clone());
        Self {
            messages: Vec::new(),
            models: Vec::new(),
            model_info: local.model().ok().flatten(),
            title: local.title().ok().flatten(),
            subtitle: local.subtitle().ok().flatten(),
            modal_open: None,
            session: Session(handle),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalType {
    Settings,
}

pub enum Action {
    SetMessages(Vec<ChatMessage>),
    AppendMessage(ChatMessage),
    SetModels(Vec<String>),
    SetHeader {
        model: Option<String>,
        title: Option<String>,
        subtitle: Option<String>,
    },
    OpenModal(ModalType),
    CloseModal,
}

impl Reducible for State {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();

        match action {
            Action::SetMessages(messages) => {
                next.messages = messages;
            }
            Action::AppendMessage(msg) => {
                next.messages.push(msg);
            }
            Action::SetModels(models) => {
                next.models = models;
            }
            Action::SetHeader {
                model,
                title,
                subtitle,
            } => {
                next.model_info = model;
                next.title = title;
                next.subtitle = subtitle;
            }
            Action::OpenModal(modal_type) => {
                next.modal_open = Some(modal_type);
            }
            Action::CloseModal => {
                next.modal_open = None;
            }
        }

        next.into()
    }
}

pub type StoreContext = UseReducerHandle<State>;
