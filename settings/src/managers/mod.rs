//! One manager per settings concern. Managers never read each other while
//! being constructed; [`crate::orchestrator`] decides the init order.

pub mod api_key;
pub mod base_url;
pub mod model;
pub mod shared_link;
pub mod system_prompt;
pub mod title;
pub mod tool_calling;
pub mod welcome;

use std::rc::Rc;

pub use api_key::ApiKeyManager;
pub use base_url::{BaseUrlFields, BaseUrlResolver};
pub use model::{ModelManager, ModelSelector};
pub use shared_link::{AppliedLink, LinkTargets, SharedLinkManager};
pub use system_prompt::SystemPromptManager;
pub use title::TitleManager;
pub use tool_calling::ToolCallingManager;
pub use welcome::WelcomeManager;

/// The eight managers of one settings session.
///
/// `model` and `base_url` are reference counted because the detection hooks
/// hold on to them.
pub struct ComponentManagers {
    pub api_key: ApiKeyManager,
    pub model: Rc<ModelManager>,
    pub system_prompt: SystemPromptManager,
    pub base_url: Rc<BaseUrlResolver>,
    pub title: TitleManager,
    pub welcome: WelcomeManager,
    pub shared_link: SharedLinkManager,
    pub tool_calling: ToolCallingManager,
}

impl ComponentManagers {
    pub fn link_targets(&self) -> LinkTargets<'_> {
        LinkTargets {
            base_url: &self.base_url,
            api_key: &self.api_key,
            system_prompt: &self.system_prompt,
            model: self.model.as_ref(),
        }
    }
}
