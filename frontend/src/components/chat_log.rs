use crate::store::StoreContext;
use settings::models::{ChatMessage, ROLE_ASSISTANT, ROLE_USER};
use wasm_bindgen_futures::JsFuture;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct MessageBubbleProps {
    pub message: ChatMessage,
}

#[function_component(MessageBubble)]
pub fn message_bubble(props: &MessageBubbleProps) -> Html {
    let message = &props.message;
    let role_class = match message.role.as_str() {
        ROLE_USER => "message-user",
        ROLE_ASSISTANT => "message-assistant",
        _ => "message-system",
    };

    let on_copy = {
        let content = message.content.clone();
        Callback::from(move |_: MouseEvent| {
            let content = content.clone();
            yew::platform::spawn_local(async move {
                if let Some(window) = web_sys::window() {
                    let promise = window.navigator().clipboard().write_text(&content);
                    let _ = JsFuture::from(promise).await;
                }
            });
        })
    };

    html! {
        <div class={classes!("message", role_class)}>
            <div class="message-content">
                if !message.is_system() {
                    <div class="message-role">{&message.role}</div>
                }
                <div class="message-text">{&message.content}</div>
                if !message.is_system() {
                    <div class="message-actions">
                        <button class="message-action-btn" onclick={on_copy} title="Copy">{"Copy"}</button>
                    </div>
                }
            </div>
        </div>
    }
}

#[function_component(ChatLog)]
pub fn chat_log() -> Html {
    let store = use_context::<StoreContext>().expect("Store context not found");

    html! {
        <div class="chat-log">
            if store.messages.is_empty() {
                <div class="empty-state">{"No messages yet"}</div>
            }
            {for store.messages.iter().map(|message| html! {
                <MessageBubble key={message.id.to_string()} message={message.clone()} />
            })}
        </div>
    }
}
