pub mod assistant_interface;
pub mod error;
pub mod openai_assistant;

pub use assistant_interface::*;
pub use error::AssistantError;
pub use openai_assistant::*;
