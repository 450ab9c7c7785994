//! Settings core for the chat client: API key provider detection, base URL
//! resolution, keystroke debouncing and the lifecycle of the component
//! managers behind the settings modal.
//!
//! Nothing here touches the DOM or browser storage directly. Those are
//! reached through [`ui::FieldHandle`] and [`store::SettingsStore`].

pub mod debounce;
pub mod detection;
pub mod error;
pub mod managers;
pub mod models;
pub mod orchestrator;
pub mod state;
pub mod store;
pub mod ui;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{SettingsError, StoreError};
