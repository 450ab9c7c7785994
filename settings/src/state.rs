use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::models::ChatMessage;

pub type SessionKeyGetter = Rc<dyn Fn() -> Option<String>>;
pub type MessagesSetter = Rc<dyn Fn(Vec<ChatMessage>)>;
pub type ModelInfoUpdater = Rc<dyn Fn()>;

/// Callbacks into the chat view, bound once the view and the managers exist.
///
/// Reads before binding are no-ops: [`session_key`] returns `None`, the
/// others do nothing.
#[derive(Default)]
pub struct SharedState {
    session_key_getter: Option<SessionKeyGetter>,
    messages_setter: Option<MessagesSetter>,
    model_info_updater: Option<ModelInfoUpdater>,
    /// Time of the last successful model catalog fetch, zero before any.
    pub last_models_fetch_time: Duration,
}

pub type SharedStateHandle = Rc<RefCell<SharedState>>;

impl SharedState {
    pub fn new_handle() -> SharedStateHandle {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Replaces all three callbacks.
    pub fn bind(
        &mut self,
        session_key_getter: SessionKeyGetter,
        messages_setter: MessagesSetter,
        model_info_updater: ModelInfoUpdater,
    ) {
        self.session_key_getter = Some(session_key_getter);
        self.messages_setter = Some(messages_setter);
        self.model_info_updater = Some(model_info_updater);
    }

    pub fn is_bound(&self) -> bool {
        self.session_key_getter.is_some()
    }
}

/// Calls out of a [`SharedStateHandle`] without holding the borrow, so a
/// callback may rebind the state.
pub fn session_key(state: &SharedStateHandle) -> Option<String> {
    let getter = state.borrow().session_key_getter.clone();
    getter.and_then(|get| get())
}

pub fn set_messages(state: &SharedStateHandle, messages: Vec<ChatMessage>) {
    let setter = state.borrow().messages_setter.clone();
    if let Some(set) = setter {
        set(messages);
    }
}

pub fn update_model_info_display(state: &SharedStateHandle) {
    let updater = state.borrow().model_info_updater.clone();
    if let Some(update) = updater {
        update();
    }
}
