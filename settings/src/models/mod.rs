pub mod message;
pub mod provider;
pub mod settings;

pub use message::*;
pub use provider::*;
pub use settings::*;
