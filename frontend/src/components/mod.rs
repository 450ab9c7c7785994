pub mod chat_log;
pub mod detection;
pub mod settings_modal;
