//! Risk template prompt
//!
//! All user inputs are embedded verbatim. The style only changes the
//! risk-count sentence.

use shared_types::{TemplateStyle, TEMPLATE_COLUMNS};

/// System message sent ahead of every prompt
pub const SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Inputs that make up one prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptInputs<'a> {
    pub business_profile: &'a str,
    pub project_profile: &'a str,
    pub tool_profile: &'a str,
    pub extra_comments: &'a str,
    pub standards_text: &'a str,
}

/// Build the user prompt for a risk template
pub fn build_prompt(inputs: &PromptInputs<'_>, style: TemplateStyle) -> String {
    format!(
        "Business Profile: {business}
Project Profile: {project}
Tool Profile: {tool}
Extra Comments: {comments}
Relevant Standards and Regulations: {standards}

Number of risks in template: {count}

Generate a comprehensive risk assessment template that is based on the above information.

The template CSV format: {columns} columns 1 header row, there should be nothing outside of this format. Header titles: {headers}. Risks should be mutually exclusive, collectively exhaustive and reference where the information came from.

The wording should be succinct, short and sharp with examples. This should be easily read by a risk manager who only has basic technical understanding.

Risk explainer column should have short explainers for a non-technical audience with examples.

Relevant Vendor Info/Docs column refers to where the inputter could potentially find this information, this should help them look in the right place, quickly.
",
        business = inputs.business_profile,
        project = inputs.project_profile,
        tool = inputs.tool_profile,
        comments = inputs.extra_comments,
        standards = inputs.standards_text,
        count = style.risk_count_clause(),
        columns = TEMPLATE_COLUMNS.len(),
        headers = TEMPLATE_COLUMNS.join(", "),
    )
}
