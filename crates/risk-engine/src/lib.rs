//! Risk template engine
//!
//! Builds the risk assessment prompt from the session, sends it to a
//! chat-completion service and renders the CSV reply.
//!
//! - [`prompt`]: prompt text with the style's risk-count clause
//! - [`completion`]: `CompletionService` trait and the OpenAI-compatible client
//! - [`render`]: one-shot CSV parse into `RenderOutcome`
//! - [`session`]: explicit in-memory form state
//! - [`generate`]: generate / regenerate workflows

pub mod completion;
pub mod error;
pub mod generate;
pub mod prompt;
pub mod render;
pub mod session;

pub use completion::{
    completion_text_from_body, ChatMessage, ChatRequest, CompletionService, CompletionSettings,
    OpenAiClient,
};
pub use error::{CompletionError, TemplateParseError};
pub use generate::{generate_template, regenerate_template, run_generation};
pub use prompt::{build_prompt, PromptInputs};
pub use render::{
    parse_template, render_template, Download, ParsedTable, RenderOutcome, RenderedTemplate,
    CSV_CONTENT_TYPE,
};
pub use session::{GenerationRequest, ProfileUpdate, Session, SessionSummary};
