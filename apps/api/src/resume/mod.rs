//! Resume analysis: PDF text extraction plus language-model interpretation.

pub mod analysis;
pub mod handlers;
pub mod prompts;
pub mod upload;
