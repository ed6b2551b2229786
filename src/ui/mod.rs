pub mod prompts;
pub mod render;

pub use prompts::{PromptConfirmation, confirm, prompt_confirmation};
