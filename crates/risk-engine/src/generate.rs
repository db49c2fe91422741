//! Generate and regenerate risk templates
//!
//! snapshot -> prompt -> one completion call -> render -> commit
//!
//! The session lock is held only while taking the snapshot and while
//! committing the result, never across the completion call.

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::completion::{ChatRequest, CompletionService, CompletionSettings};
use crate::error::CompletionError;
use crate::prompt::build_prompt;
use crate::render::{render_template, RenderedTemplate};
use crate::session::{GenerationRequest, Session};
use shared_types::TemplateStyle;

/// Run one generation from a session snapshot
pub async fn run_generation(
    service: &dyn CompletionService,
    request: &GenerationRequest,
    settings: &CompletionSettings,
) -> Result<RenderedTemplate, CompletionError> {
    let prompt = build_prompt(&request.prompt_inputs(), request.style);

    info!(
        "Generating {} via {}: style={}, prompt={} chars",
        request.file_name,
        service.name(),
        request.style.as_str(),
        prompt.len()
    );

    let chat = ChatRequest::for_prompt(prompt, settings);
    let text = service.complete(&chat).await?;

    Ok(render_template(text, request.file_name))
}

/// First generation with the chosen style
pub async fn generate_template(
    service: &dyn CompletionService,
    session: &Mutex<Session>,
    style: TemplateStyle,
    settings: &CompletionSettings,
) -> Result<RenderedTemplate, CompletionError> {
    let request = session.lock().await.generation_request(style);
    complete_and_commit(service, session, request, settings).await
}

/// Regenerate with edit comments appended to the extra comments
pub async fn regenerate_template(
    service: &dyn CompletionService,
    session: &Mutex<Session>,
    edit_comments: &str,
    settings: &CompletionSettings,
) -> Result<RenderedTemplate, CompletionError> {
    let request = session.lock().await.regeneration_request(edit_comments);
    complete_and_commit(service, session, request, settings).await
}

async fn complete_and_commit(
    service: &dyn CompletionService,
    session: &Mutex<Session>,
    request: GenerationRequest,
    settings: &CompletionSettings,
) -> Result<RenderedTemplate, CompletionError> {
    let rendered = match run_generation(service, &request, settings).await {
        Ok(rendered) => rendered,
        Err(e) => {
            warn!("Generation of {} failed: {}", request.file_name, e);
            return Err(e);
        }
    };

    session
        .lock()
        .await
        .commit_template(&request, rendered.clone());

    Ok(rendered)
}
