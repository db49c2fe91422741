//! In-memory form session
//!
//! Everything the form has collected so far. One instance per process;
//! handlers receive it explicitly instead of reading globals.

use serde::{Deserialize, Serialize};
use shared_types::{RiskProfile, TemplateStyle, RISK_TEMPLATE_FILE, UPDATED_RISK_TEMPLATE_FILE};

use crate::prompt::PromptInputs;
use crate::render::{Download, RenderedTemplate};

/// Partial profile update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub business_profile: Option<String>,
    pub project_profile: Option<String>,
    pub tool_profile: Option<String>,
    pub extra_comments: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub profile: RiskProfile,
    pub style: TemplateStyle,
    pub standards_text: String,
    pub standards_files: Vec<String>,
    pub last_template: Option<RenderedTemplate>,
}

/// Snapshot of what the next completion call needs.
///
/// Owned so the session lock can be released while the request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub profile: RiskProfile,
    pub comments: String,
    pub standards_text: String,
    pub style: TemplateStyle,
    pub file_name: &'static str,
}

impl GenerationRequest {
    pub fn prompt_inputs(&self) -> PromptInputs<'_> {
        PromptInputs {
            business_profile: &self.profile.business_profile,
            project_profile: &self.profile.project_profile,
            tool_profile: &self.profile.tool_profile,
            extra_comments: &self.comments,
            standards_text: &self.standards_text,
        }
    }
}

/// Public view of the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub profile: RiskProfile,
    pub style: TemplateStyle,
    pub standards_files: Vec<String>,
    pub standards_characters: usize,
    pub has_template: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        if let Some(value) = update.business_profile {
            self.profile.business_profile = value;
        }
        if let Some(value) = update.project_profile {
            self.profile.project_profile = value;
        }
        if let Some(value) = update.tool_profile {
            self.profile.tool_profile = value;
        }
        if let Some(value) = update.extra_comments {
            self.profile.extra_comments = value;
        }
    }

    /// Replace the standards text with a new extraction
    pub fn set_standards(&mut self, files: Vec<String>, text: String) {
        self.standards_files = files;
        self.standards_text = text;
    }

    pub fn clear_standards(&mut self) {
        self.standards_files.clear();
        self.standards_text.clear();
    }

    /// Extra comments followed by edit comments, space separated and trimmed
    pub fn combined_comments(&self, edit_comments: &str) -> String {
        format!("{} {}", self.profile.extra_comments, edit_comments)
            .trim()
            .to_string()
    }

    /// Snapshot a first-generation request with the chosen style
    pub fn generation_request(&self, style: TemplateStyle) -> GenerationRequest {
        GenerationRequest {
            profile: self.profile.clone(),
            comments: self.profile.extra_comments.clone(),
            standards_text: self.standards_text.clone(),
            style,
            file_name: RISK_TEMPLATE_FILE,
        }
    }

    /// Snapshot a regeneration request using the current style
    pub fn regeneration_request(&self, edit_comments: &str) -> GenerationRequest {
        GenerationRequest {
            profile: self.profile.clone(),
            comments: self.combined_comments(edit_comments),
            standards_text: self.standards_text.clone(),
            style: self.style,
            file_name: UPDATED_RISK_TEMPLATE_FILE,
        }
    }

    /// Keep the result of a completed request. The request's style becomes
    /// the session style only here, so a failed call changes nothing.
    pub fn commit_template(&mut self, request: &GenerationRequest, template: RenderedTemplate) {
        self.style = request.style;
        self.last_template = Some(template);
    }

    /// The last template, if it parsed and can be downloaded
    pub fn download(&self) -> Option<Download<'_>> {
        self.last_template.as_ref().and_then(|t| t.download())
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            profile: self.profile.clone(),
            style: self.style,
            standards_files: self.standards_files.clone(),
            standards_characters: self.standards_text.chars().count(),
            has_template: self.last_template.is_some(),
        }
    }
}
